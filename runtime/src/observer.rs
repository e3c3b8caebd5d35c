//! Observers receive a running commentary of a negotiation.
//!
//! Observers are advisory: the negotiator ignores anything they do, and the
//! result of a run is the same whichever observer is installed.

use checkin_camera_core::{AttemptContext, AttemptRecord, NegotiationResult};
use std::sync::Arc;

/// Sink for negotiation diagnostics. Every method defaults to a no-op.
pub trait NegotiationObserver: Send + Sync {
    /// The run was called without constraint bases.
    fn no_constraint_bases(&self) {}

    /// An attempt is about to call `start`.
    fn attempt_started(&self, _context: &AttemptContext) {}

    /// An attempt was rejected.
    fn attempt_failed(&self, _record: &AttemptRecord) {}

    /// The camera started.
    fn started(&self, _result: &NegotiationResult) {}

    /// Every combination failed.
    fn exhausted(&self, _attempts: &[AttemptRecord]) {}
}

impl<O: NegotiationObserver + ?Sized> NegotiationObserver for Arc<O> {
    fn no_constraint_bases(&self) {
        (**self).no_constraint_bases();
    }

    fn attempt_started(&self, context: &AttemptContext) {
        (**self).attempt_started(context);
    }

    fn attempt_failed(&self, record: &AttemptRecord) {
        (**self).attempt_failed(record);
    }

    fn started(&self, result: &NegotiationResult) {
        (**self).started(result);
    }

    fn exhausted(&self, attempts: &[AttemptRecord]) {
        (**self).exhausted(attempts);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl NegotiationObserver for NoopObserver {}

/// Emits structured `tracing` events.
///
/// The negotiator wraps each attempt in a `camera_start_attempt` span, so the
/// events of one attempt are grouped under it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl NegotiationObserver for TracingObserver {
    fn no_constraint_bases(&self) {
        tracing::error!("Camera negotiation called without constraint bases");
    }

    fn attempt_started(&self, context: &AttemptContext) {
        tracing::debug!(
            attempt = context.attempt,
            base_index = context.base_index,
            preset = %context.preset,
            constraints = %context.constraints,
            scan_config = %context.scan_config,
            "Starting camera"
        );
    }

    fn attempt_failed(&self, record: &AttemptRecord) {
        tracing::warn!(
            base_index = record.base_index,
            preset = %record.preset_label,
            error_name = record.error_name.as_deref().unwrap_or("<none>"),
            error_message = %record.error_message,
            elapsed_ms = record.elapsed.as_millis(),
            "Camera start rejected, trying next configuration"
        );
    }

    fn started(&self, result: &NegotiationResult) {
        tracing::info!(
            preset = %result.chosen_preset,
            base_index = result.base_index,
            constraints = %result.effective_constraints,
            attempts = result.attempt_count(),
            "Camera started"
        );
    }

    fn exhausted(&self, attempts: &[AttemptRecord]) {
        let last_error = attempts
            .last()
            .map_or_else(|| "<none>".to_string(), AttemptRecord::describe_error);
        tracing::error!(
            attempts = attempts.len(),
            last_error = %last_error,
            "Camera could not be started with any configuration"
        );
    }
}
