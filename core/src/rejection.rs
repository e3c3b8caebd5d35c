//! What a scanner capability rejects with, and how it is normalized.
//!
//! Capabilities are free to reject a start attempt however they like. The
//! negotiator only needs a `name` (when there is one) and a `message`, which
//! [`StartRejection::normalize`] extracts:
//!
//! - [`StartRejection::Named`] keeps its name and message.
//! - [`StartRejection::Message`] becomes the message verbatim, with no name.
//! - [`StartRejection::Payload`] is JSON-stringified; if that fails the
//!   payload's `Display` output is used instead.

use serde::Serialize;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// A value a capability can reject with when it is neither a named error nor a
/// plain message.
///
/// Blanket-implemented for every `Serialize + Display + Debug + Send + Sync`
/// type.
pub trait RejectionPayload: fmt::Debug + fmt::Display + Send + Sync {
    /// Render the payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error when the payload cannot be represented as
    /// JSON (non-string map keys, self-referencing data, ...).
    fn to_json(&self) -> Result<String, serde_json::Error>;
}

impl<T> RejectionPayload for T
where
    T: Serialize + fmt::Debug + fmt::Display + Send + Sync,
{
    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Why a scanner capability refused to start.
#[derive(Debug, Clone)]
pub enum StartRejection {
    /// A platform error carrying a DOM-style name such as `NotAllowedError`.
    Named {
        /// Error name, if the platform supplied one.
        name: Option<String>,
        /// Human-readable message.
        message: String,
    },
    /// A bare message with no error name.
    Message(String),
    /// Any other value.
    Payload(Arc<dyn RejectionPayload>),
    /// The attempt did not settle within the configured per-attempt timeout.
    Timeout(Duration),
}

impl StartRejection {
    /// Build a named rejection.
    #[must_use]
    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Named {
            name: Some(name.into()),
            message: message.into(),
        }
    }

    /// Wrap an arbitrary payload.
    #[must_use]
    pub fn payload<P: RejectionPayload + 'static>(payload: P) -> Self {
        Self::Payload(Arc::new(payload))
    }

    /// Reduce the rejection to a name and a message.
    #[must_use]
    pub fn normalize(&self) -> NormalizedError {
        let (name, message) = match self {
            Self::Named { name, message } => (name.clone(), message.clone()),
            Self::Message(message) => (None, message.clone()),
            Self::Payload(payload) => (
                None,
                payload.to_json().unwrap_or_else(|_| payload.to_string()),
            ),
            Self::Timeout(after) => (
                Some("TimeoutError".to_string()),
                format!("Camera did not start within {}ms", after.as_millis()),
            ),
        };
        NormalizedError {
            name,
            message,
            raw: self.clone(),
        }
    }
}

impl fmt::Display for StartRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.normalize(), f)
    }
}

impl std::error::Error for StartRejection {}

impl From<String> for StartRejection {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for StartRejection {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<io::Error> for StartRejection {
    fn from(err: io::Error) -> Self {
        let name = match err.kind() {
            io::ErrorKind::NotFound => "NotFoundError",
            io::ErrorKind::PermissionDenied => "NotAllowedError",
            io::ErrorKind::ResourceBusy | io::ErrorKind::AddrInUse => "NotReadableError",
            io::ErrorKind::TimedOut => "TimeoutError",
            io::ErrorKind::Unsupported | io::ErrorKind::InvalidInput => "OverconstrainedError",
            _ => "Error",
        };
        Self::named(name, err.to_string())
    }
}

/// A rejection reduced to what diagnostics need.
#[derive(Debug, Clone)]
pub struct NormalizedError {
    /// Error name, when the rejection had one.
    pub name: Option<String>,
    /// Error message.
    pub message: String,
    /// The original rejection.
    pub raw: StartRejection,
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}
