//! # Check-in Camera Testing
//!
//! Testing utilities for camera-start negotiation.
//!
//! This crate provides:
//! - [`MockScanner`]: a scripted [`CameraScanner`](checkin_camera_core::CameraScanner)
//! - [`RecordingObserver`]: captures negotiation diagnostics in order
//! - Fixtures for common constraint bases and decode handlers
//! - proptest strategies for presets and constraint bases
//!
//! ## Example
//!
//! ```ignore
//! use checkin_camera_testing::{MockScanner, RecordingObserver, fixtures};
//! use checkin_camera_runtime::{CameraStartNegotiator, NegotiateParams, NegotiatorConfig};
//!
//! #[tokio::test]
//! async fn test_rear_camera_falls_back() {
//!     let scanner = MockScanner::rejecting("busy").succeed_on_call(7);
//!     let observer = RecordingObserver::new();
//!     let negotiator = CameraStartNegotiator::with_observer(NegotiatorConfig::default(), observer.clone());
//!
//!     let result = negotiator
//!         .negotiate(&scanner, NegotiateParams::new(fixtures::rear_camera_bases(), fixtures::discard_decoded()))
//!         .await
//!         .unwrap();
//!     assert_eq!(result.base_index, 1);
//! }
//! ```

/// Scripted scanner capability
pub mod scanner_mocks;

/// Recording observer
pub mod observer_mocks;

/// Common test inputs.
pub mod fixtures {
    use checkin_camera_core::{ConstraintBase, DecodedTextHandler, DeviceConstraints, FacingMode};
    use std::sync::{Arc, Mutex};

    /// Strict rear camera first, then a rear-camera preference.
    #[must_use]
    pub fn rear_camera_bases() -> Vec<ConstraintBase> {
        vec![
            DeviceConstraints::facing_exact(FacingMode::Environment),
            DeviceConstraints::facing(FacingMode::Environment),
        ]
    }

    /// A decoded-text handler that drops everything.
    #[must_use]
    pub fn discard_decoded() -> DecodedTextHandler {
        Arc::new(|_: &str| {})
    }

    /// A decoded-text handler that appends into the returned log.
    #[must_use]
    pub fn collect_decoded() -> (DecodedTextHandler, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let handler: DecodedTextHandler = Arc::new(move |text: &str| {
            if let Ok(mut log) = sink.lock() {
                log.push(text.to_string());
            }
        });
        (handler, log)
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use checkin_camera_core::{ConstraintBase, DeviceConstraints, FacingMode, QualityPreset};
    use proptest::prelude::*;

    /// A preset with random dimensions (or none) and frame rate.
    pub fn arb_preset() -> impl Strategy<Value = QualityPreset> {
        (
            prop::option::of((160u32..=3840, 120u32..=2160)),
            1u32..=60,
        )
            .prop_map(|(dims, fps)| match dims {
                Some((w, h)) => QualityPreset::new(format!("{w}x{h}@{fps}"), Some(w), Some(h), fps),
                None => QualityPreset::new(format!("auto@{fps}"), None, None, fps),
            })
    }

    /// A ladder of `1..=max_len` presets.
    pub fn arb_ladder(max_len: usize) -> impl Strategy<Value = Vec<QualityPreset>> {
        prop::collection::vec(arb_preset(), 1..=max_len)
    }

    /// A constraint base tagged with its position so attempts can be traced back.
    pub fn arb_constraint_base(index: usize) -> impl Strategy<Value = ConstraintBase> {
        prop_oneof![Just(FacingMode::User), Just(FacingMode::Environment)].prop_map(move |mode| {
            DeviceConstraints::facing(mode).with_field("testBase", serde_json::json!(index))
        })
    }

    /// `1..=max_len` tagged constraint bases.
    pub fn arb_constraint_bases(max_len: usize) -> impl Strategy<Value = Vec<ConstraintBase>> {
        (1..=max_len).prop_flat_map(|len| {
            (0..len)
                .map(arb_constraint_base)
                .collect::<Vec<_>>()
        })
    }
}

/// Install a test-friendly `tracing` subscriber. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkin_camera_runtime=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use observer_mocks::{ObservedEvent, RecordingObserver};
pub use scanner_mocks::{MockScanner, ScannerCall, ScriptedOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_decoded_records_payloads() {
        let (handler, log) = fixtures::collect_decoded();
        handler("TICKET-1");
        handler("TICKET-2");
        assert_eq!(log.lock().map(|l| l.clone()).unwrap_or_default(), ["TICKET-1", "TICKET-2"]);
    }

    #[test]
    fn test_rear_camera_bases_order() {
        let bases = fixtures::rear_camera_bases();
        assert_eq!(bases.len(), 2);
        assert!(bases[0].get("facingMode").is_some_and(serde_json::Value::is_object));
        assert!(bases[1].get("facingMode").is_some_and(serde_json::Value::is_string));
    }
}
