//! Negotiation metrics.
//!
//! Recorded through the `metrics` facade; they cost nothing until the host
//! application installs a recorder (for example a Prometheus exporter).
//!
//! # Metrics
//!
//! - `camera_negotiation_attempts_total{preset}`: `start` calls made
//! - `camera_negotiation_failures_total{preset,error}`: rejected attempts
//! - `camera_negotiation_started_total{preset}`: runs that started a camera
//! - `camera_negotiation_exhausted_total`: runs where nothing started
//! - `camera_negotiation_attempt_duration_seconds`: time until `start` settled

use metrics::{Unit, counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Attempts counter name.
pub const ATTEMPTS_TOTAL: &str = "camera_negotiation_attempts_total";
/// Failures counter name.
pub const FAILURES_TOTAL: &str = "camera_negotiation_failures_total";
/// Successful runs counter name.
pub const STARTED_TOTAL: &str = "camera_negotiation_started_total";
/// Exhausted runs counter name.
pub const EXHAUSTED_TOTAL: &str = "camera_negotiation_exhausted_total";
/// Attempt duration histogram name.
pub const ATTEMPT_DURATION_SECONDS: &str = "camera_negotiation_attempt_duration_seconds";

/// Register metric descriptions with the installed recorder.
pub fn register_metrics() {
    describe_counter!(ATTEMPTS_TOTAL, Unit::Count, "Camera start attempts made");
    describe_counter!(FAILURES_TOTAL, Unit::Count, "Camera start attempts rejected");
    describe_counter!(STARTED_TOTAL, Unit::Count, "Negotiations that started a camera");
    describe_counter!(
        EXHAUSTED_TOTAL,
        Unit::Count,
        "Negotiations where every configuration was rejected"
    );
    describe_histogram!(
        ATTEMPT_DURATION_SECONDS,
        Unit::Seconds,
        "Time until a camera start attempt settled"
    );
}

pub(crate) fn record_attempt(preset: &str, elapsed: Duration) {
    counter!(ATTEMPTS_TOTAL, "preset" => preset.to_string()).increment(1);
    histogram!(ATTEMPT_DURATION_SECONDS).record(elapsed.as_secs_f64());
}

pub(crate) fn record_failure(preset: &str, error_name: Option<&str>) {
    counter!(
        FAILURES_TOTAL,
        "preset" => preset.to_string(),
        "error" => error_name.unwrap_or("unknown").to_string()
    )
    .increment(1);
}

pub(crate) fn record_started(preset: &str) {
    counter!(STARTED_TOTAL, "preset" => preset.to_string()).increment(1);
}

pub(crate) fn record_exhausted() {
    counter!(EXHAUSTED_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_failure_without_name_is_labelled_unknown() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            register_metrics();
            record_failure("720p@15", None);
            record_failure("720p@15", Some("NotReadableError"));
            record_exhausted();
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"error="unknown""#));
        assert!(rendered.contains(r#"error="NotReadableError""#));
        assert!(rendered.contains("camera_negotiation_exhausted_total 1"));
    }
}
