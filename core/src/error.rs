//! Errors surfaced by a negotiation.
//!
//! Individual attempt failures never appear here: they are recorded as
//! [`AttemptRecord`]s and the ladder moves on. Only an unusable call or a fully
//! exhausted ladder is an error.

use crate::attempt::AttemptRecord;
use thiserror::Error;

/// Terminal negotiation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// No constraint bases were supplied; nothing was attempted.
    #[error("No camera constraint bases were provided")]
    EmptyConstraintBases,

    /// Every (constraint base, preset) combination was rejected.
    #[error("{message}")]
    AllAttemptsExhausted {
        /// Summary built from the last failed attempt.
        message: String,
        /// Every failed attempt, in the order made.
        attempts: Vec<AttemptRecord>,
    },
}

impl NegotiationError {
    /// Build the exhaustion error from the attempts made.
    #[must_use]
    pub fn exhausted(attempts: Vec<AttemptRecord>) -> Self {
        let message = match attempts.last() {
            Some(last) => format!("Failed to start camera. Last error: {}", last.describe_error()),
            None => "Failed to start camera. Unknown error".to_string(),
        };
        Self::AllAttemptsExhausted { message, attempts }
    }

    /// Failed attempts behind this error.
    #[must_use]
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            Self::EmptyConstraintBases => &[],
            Self::AllAttemptsExhausted { attempts, .. } => attempts,
        }
    }
}
