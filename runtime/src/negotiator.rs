//! Camera-start negotiation over a ladder of (constraint base × quality preset).
//!
//! For each constraint base in order, every preset is tried in order until the
//! scanner starts. Constraint bases are the outer loop, presets the inner one.
//! Attempts run strictly one after another: only one camera can be acquired at
//! a time, and a rejected attempt has already released the device.
//!
//! # Example
//!
//! ```rust,no_run
//! use checkin_camera_core::{CameraScanner, DeviceConstraints, FacingMode, ScanConfig};
//! use checkin_camera_runtime::{CameraStartNegotiator, NegotiateParams, NegotiatorConfig};
//! use std::sync::Arc;
//!
//! # async fn example(scanner: &dyn CameraScanner) -> Result<(), Box<dyn std::error::Error>> {
//! let negotiator = CameraStartNegotiator::new(NegotiatorConfig::default());
//!
//! let params = NegotiateParams::new(
//!     vec![
//!         DeviceConstraints::facing_exact(FacingMode::Environment),
//!         DeviceConstraints::facing(FacingMode::Environment),
//!     ],
//!     Arc::new(|text: &str| println!("scanned {text}")),
//! )
//! .scan_config(ScanConfig::new(10));
//!
//! let result = negotiator.negotiate(scanner, params).await?;
//! println!("camera running at {}", result.chosen_preset);
//! # Ok(())
//! # }
//! ```

use crate::config::NegotiatorConfig;
use crate::metrics;
use crate::observer::{NegotiationObserver, TracingObserver};
use checkin_camera_core::{
    AttemptContext, AttemptRecord, CameraScanner, ConstraintBase, DecodedTextHandler,
    NegotiationError, NegotiationResult, QualityPreset, ScanConfig, StartRejection,
    ignore_decode_errors,
};
use std::time::Instant;
use tracing::Instrument;

/// Inputs of one negotiation run.
#[derive(Clone)]
pub struct NegotiateParams {
    /// Device-selection descriptors, tried in order.
    pub constraint_bases: Vec<ConstraintBase>,
    /// Forwarded unchanged to every `start` call.
    pub on_decoded: DecodedTextHandler,
    /// Caller scan configuration; only `fps` is overridden per attempt.
    pub base_scan_config: ScanConfig,
    /// Ladder for this run, replacing the configured one.
    pub presets: Option<Vec<QualityPreset>>,
}

impl NegotiateParams {
    /// Parameters with the default scan configuration and the configured ladder.
    #[must_use]
    pub fn new(constraint_bases: Vec<ConstraintBase>, on_decoded: DecodedTextHandler) -> Self {
        Self {
            constraint_bases,
            on_decoded,
            base_scan_config: ScanConfig::default(),
            presets: None,
        }
    }

    /// Set the caller scan configuration.
    #[must_use]
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.base_scan_config = config;
        self
    }

    /// Use a custom ladder for this run.
    #[must_use]
    pub fn presets(mut self, presets: Vec<QualityPreset>) -> Self {
        self.presets = Some(presets);
        self
    }
}

impl std::fmt::Debug for NegotiateParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NegotiateParams")
            .field("constraint_bases", &self.constraint_bases)
            .field("base_scan_config", &self.base_scan_config)
            .field("presets", &self.presets)
            .finish_non_exhaustive()
    }
}

/// Finds the first (constraint base, preset) combination the scanner accepts.
///
/// A negotiator holds only configuration and an observer; each call to
/// [`negotiate`](Self::negotiate) keeps its own attempt log, so one negotiator
/// can serve concurrent check-in sessions.
#[derive(Debug, Clone, Default)]
pub struct CameraStartNegotiator<O = TracingObserver> {
    config: NegotiatorConfig,
    observer: O,
}

impl CameraStartNegotiator<TracingObserver> {
    /// Negotiator with the given configuration, logging through `tracing`.
    #[must_use]
    pub const fn new(config: NegotiatorConfig) -> Self {
        Self {
            config,
            observer: TracingObserver,
        }
    }
}

impl<O: NegotiationObserver> CameraStartNegotiator<O> {
    /// Negotiator reporting to a custom observer.
    #[must_use]
    pub const fn with_observer(config: NegotiatorConfig, observer: O) -> Self {
        Self { config, observer }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &NegotiatorConfig {
        &self.config
    }

    /// Start `scanner` with the best combination it accepts.
    ///
    /// On success the scanner is left running; stopping it belongs to the
    /// caller. Decode errors reported by the scanner are ignored.
    ///
    /// # Errors
    ///
    /// - [`NegotiationError::EmptyConstraintBases`] if no bases were given.
    ///   Nothing is attempted.
    /// - [`NegotiationError::AllAttemptsExhausted`] if every combination was
    ///   rejected (or the ladder is empty). The message names the last error.
    pub async fn negotiate<S>(
        &self,
        scanner: &S,
        params: NegotiateParams,
    ) -> Result<NegotiationResult, NegotiationError>
    where
        S: CameraScanner + ?Sized,
    {
        if params.constraint_bases.is_empty() {
            self.observer.no_constraint_bases();
            return Err(NegotiationError::EmptyConstraintBases);
        }

        let presets = params.presets.as_ref().unwrap_or(&self.config.presets);
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut attempt = 0;

        for (base_index, base) in params.constraint_bases.iter().enumerate() {
            for (preset_index, preset) in presets.iter().enumerate() {
                attempt += 1;
                let context = AttemptContext {
                    attempt,
                    base_index,
                    preset_index,
                    preset: preset.clone(),
                    constraints: base.with_preset(preset),
                    scan_config: params.base_scan_config.with_fps(preset.fps),
                };

                let span = tracing::debug_span!(
                    "camera_start_attempt",
                    attempt,
                    base_index,
                    preset = %preset.label,
                );

                match self
                    .attempt(scanner, &context, &params.on_decoded)
                    .instrument(span)
                    .await
                {
                    Ok(()) => {
                        metrics::record_started(&preset.label);
                        let result = NegotiationResult {
                            chosen_preset: context.preset,
                            effective_constraints: context.constraints,
                            scan_config: context.scan_config,
                            base_index,
                            preset_index,
                            attempts,
                        };
                        self.observer.started(&result);
                        return Ok(result);
                    }
                    Err(record) => attempts.push(record),
                }
            }
        }

        metrics::record_exhausted();
        self.observer.exhausted(&attempts);
        Err(NegotiationError::exhausted(attempts))
    }

    /// One `start` call. A rejection is turned into an [`AttemptRecord`].
    async fn attempt<S>(
        &self,
        scanner: &S,
        context: &AttemptContext,
        on_decoded: &DecodedTextHandler,
    ) -> Result<(), AttemptRecord>
    where
        S: CameraScanner + ?Sized,
    {
        self.observer.attempt_started(context);

        let started_at = Instant::now();
        let start = scanner.start(
            context.constraints.clone(),
            context.scan_config.clone(),
            on_decoded.clone(),
            ignore_decode_errors(),
        );
        let outcome = match self.config.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, start)
                .await
                .unwrap_or(Err(StartRejection::Timeout(limit))),
            None => start.await,
        };
        let elapsed = started_at.elapsed();
        metrics::record_attempt(&context.preset.label, elapsed);

        outcome.map_err(|rejection| {
            let normalized = rejection.normalize();
            let record = AttemptRecord::failed(context, &normalized, elapsed);
            metrics::record_failure(&record.preset_label, record.error_name.as_deref());
            self.observer.attempt_failed(&record);
            record
        })
    }
}

/// Negotiate with the default ladder and `tracing` diagnostics.
///
/// # Errors
///
/// See [`CameraStartNegotiator::negotiate`].
pub async fn negotiate<S>(
    scanner: &S,
    params: NegotiateParams,
) -> Result<NegotiationResult, NegotiationError>
where
    S: CameraScanner + ?Sized,
{
    CameraStartNegotiator::new(NegotiatorConfig::default())
        .negotiate(scanner, params)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use checkin_camera_core::{DecodeErrorHandler, DeviceConstraints, ScannerFuture};
    use crate::metrics::{ATTEMPTS_TOTAL, FAILURES_TOTAL, STARTED_TOTAL};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Starts on call `succeed_on` (1-based), rejects every other call.
    struct CountingScanner {
        calls: AtomicUsize,
        succeed_on: usize,
    }

    impl CountingScanner {
        fn new(succeed_on: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                succeed_on,
            }
        }
    }

    impl CameraScanner for CountingScanner {
        fn start(
            &self,
            _constraints: DeviceConstraints,
            _config: ScanConfig,
            _on_decoded: DecodedTextHandler,
            _on_decode_error: DecodeErrorHandler,
        ) -> ScannerFuture<'_> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let succeed = call == self.succeed_on;
            Box::pin(async move {
                if succeed {
                    Ok(())
                } else {
                    Err(StartRejection::named("OverconstrainedError", format!("call {call}")))
                }
            })
        }

        fn stop(&self) -> ScannerFuture<'_> {
            Box::pin(async { Ok(()) })
        }
    }

    fn params() -> NegotiateParams {
        NegotiateParams::new(vec![DeviceConstraints::new()], Arc::new(|_: &str| {}))
    }

    #[tokio::test]
    async fn test_observer_choice_does_not_change_result() {
        let traced = CameraStartNegotiator::new(NegotiatorConfig::default())
            .negotiate(&CountingScanner::new(4), params())
            .await
            .unwrap();
        let silent = CameraStartNegotiator::with_observer(NegotiatorConfig::default(), NoopObserver)
            .negotiate(&CountingScanner::new(4), params())
            .await
            .unwrap();

        let messages = |r: &NegotiationResult| {
            r.attempts
                .iter()
                .map(AttemptRecord::describe_error)
                .collect::<Vec<_>>()
        };
        assert_eq!(traced.chosen_preset, silent.chosen_preset);
        assert_eq!(traced.effective_constraints, silent.effective_constraints);
        assert_eq!(messages(&traced), messages(&silent));
        assert_eq!(traced.chosen_preset.label, "720p@30");
    }

    #[tokio::test]
    async fn test_dyn_scanner_is_accepted() {
        let scanner: Arc<dyn CameraScanner> = Arc::new(CountingScanner::new(1));
        let result = negotiate(scanner.as_ref(), params()).await.unwrap();
        assert_eq!(result.attempt_count(), 1);
        assert_eq!(result.effective_constraints.ideal_width(), Some(3840));
    }

    #[tokio::test]
    async fn test_params_presets_override_config() {
        let negotiator = CameraStartNegotiator::with_observer(NegotiatorConfig::default(), NoopObserver);
        let ladder = QualityPreset::parse_ladder("480p@10").unwrap();

        let err = negotiator
            .negotiate(&CountingScanner::new(0), params().presets(ladder))
            .await
            .unwrap_err();

        assert_eq!(err.attempts().len(), 1);
        assert_eq!(err.attempts()[0].preset_label, "480p@10");
        assert_eq!(
            err.to_string(),
            "Failed to start camera. Last error: OverconstrainedError: call 1"
        );
    }

    #[test]
    fn test_params_debug_omits_handler() {
        let rendered = format!("{:?}", params());
        assert!(rendered.contains("constraint_bases"));
        assert!(!rendered.contains("on_decoded"));
    }

    fn line_for<'a>(rendered: &'a str, metric: &str, preset: &str) -> &'a str {
        rendered
            .lines()
            .find(|l| l.starts_with(metric) && l.contains(&format!(r#"preset="{preset}""#)))
            .unwrap()
    }

    #[test]
    fn test_metrics_record_each_attempt_and_the_start() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let negotiator = CameraStartNegotiator::with_observer(NegotiatorConfig::default(), NoopObserver);

        let result = ::metrics::with_local_recorder(&recorder, || {
            tokio_test::block_on(negotiator.negotiate(&CountingScanner::new(2), params()))
        })
        .unwrap();
        assert_eq!(result.chosen_preset.label, "1440p@30");

        let rendered = handle.render();
        assert!(line_for(&rendered, ATTEMPTS_TOTAL, "4K@30").ends_with(" 1"));
        assert!(line_for(&rendered, ATTEMPTS_TOTAL, "1440p@30").ends_with(" 1"));

        let failure = line_for(&rendered, FAILURES_TOTAL, "4K@30");
        assert!(failure.contains(r#"error="OverconstrainedError""#));
        assert!(failure.ends_with(" 1"));
        assert!(!rendered.contains(r#"camera_negotiation_failures_total{preset="1440p@30""#));

        assert!(line_for(&rendered, STARTED_TOTAL, "1440p@30").ends_with(" 1"));
        assert!(rendered.contains("camera_negotiation_attempt_duration_seconds_count 2"));
        assert!(!rendered.contains("camera_negotiation_exhausted_total 1"));
    }

    #[test]
    fn test_metrics_record_exhaustion() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let negotiator = CameraStartNegotiator::with_observer(NegotiatorConfig::default(), NoopObserver);

        let err = ::metrics::with_local_recorder(&recorder, || {
            tokio_test::block_on(negotiator.negotiate(&CountingScanner::new(0), params()))
        })
        .unwrap_err();
        assert_eq!(err.attempts().len(), 6);

        let rendered = handle.render();
        assert!(rendered.contains("camera_negotiation_exhausted_total 1"));
        assert!(rendered.contains("camera_negotiation_attempt_duration_seconds_count 6"));
        assert!(!rendered.contains(STARTED_TOTAL));
    }
}

