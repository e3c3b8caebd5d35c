//! Per-attempt bookkeeping and the successful outcome of a negotiation.

use crate::constraints::{DeviceConstraints, ScanConfig};
use crate::preset::QualityPreset;
use crate::rejection::NormalizedError;
use serde::Serialize;
use std::time::Duration;

/// Everything the negotiator is about to hand to the scanner for one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptContext {
    /// 1-based attempt number within the run.
    pub attempt: usize,
    /// Index of the constraint base in use.
    pub base_index: usize,
    /// Index of the preset in the ladder.
    pub preset_index: usize,
    /// Preset being tried.
    pub preset: QualityPreset,
    /// Base merged with the preset's dimensions.
    pub constraints: DeviceConstraints,
    /// Caller configuration with the preset's frame rate.
    pub scan_config: ScanConfig,
}

/// One failed start attempt. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    /// Label of the preset that failed.
    pub preset_label: String,
    /// Index of the constraint base in use.
    pub base_index: usize,
    /// Index of the preset in the ladder.
    pub preset_index: usize,
    /// Normalized error name, if any.
    pub error_name: Option<String>,
    /// Normalized error message.
    pub error_message: String,
    /// How long the scanner took to reject.
    pub elapsed: Duration,
}

impl AttemptRecord {
    /// Record a failure of the attempt described by `context`.
    #[must_use]
    pub fn failed(context: &AttemptContext, error: &NormalizedError, elapsed: Duration) -> Self {
        Self {
            preset_label: context.preset.label.clone(),
            base_index: context.base_index,
            preset_index: context.preset_index,
            error_name: error.name.clone(),
            error_message: error.message.clone(),
            elapsed,
        }
    }

    /// `name: message`, or just `message` when there is no name.
    #[must_use]
    pub fn describe_error(&self) -> String {
        match &self.error_name {
            Some(name) => format!("{name}: {}", self.error_message),
            None => self.error_message.clone(),
        }
    }
}

/// The combination that started the camera.
///
/// When this is returned the scanner is running; stopping it is the caller's
/// job.
#[derive(Debug, Clone, Serialize)]
pub struct NegotiationResult {
    /// Preset that worked.
    pub chosen_preset: QualityPreset,
    /// Constraints the scanner accepted.
    pub effective_constraints: DeviceConstraints,
    /// Scan configuration the scanner accepted.
    pub scan_config: ScanConfig,
    /// Index of the constraint base that worked.
    pub base_index: usize,
    /// Index of the preset that worked.
    pub preset_index: usize,
    /// Failures that preceded success.
    pub attempts: Vec<AttemptRecord>,
}

impl NegotiationResult {
    /// Total number of `start` calls made, the successful one included.
    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts.len() + 1
    }
}
