//! Scripted scanner capability for negotiation tests.
//!
//! [`MockScanner`] records every `start` call and answers it from a script:
//! outcomes pinned to a call number win, then predicate rules in the order they
//! were added, then the default outcome.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Mutex poisoning only follows a panicking test

use checkin_camera_core::{
    CameraScanner, DecodeErrorHandler, DecodeFailure, DecodedTextHandler, DeviceConstraints,
    ScanConfig, ScannerFuture, StartRejection,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// How the mock answers one `start` call.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Resolve: the camera is running.
    Start,
    /// Reject with the given value.
    Reject(StartRejection),
    /// Never settle.
    Hang,
}

/// One recorded `start` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerCall {
    /// 1-based call number.
    pub call: usize,
    /// Constraints passed to `start`.
    pub constraints: DeviceConstraints,
    /// Scan configuration passed to `start`.
    pub config: ScanConfig,
}

type Rule = Box<dyn Fn(&DeviceConstraints, &ScanConfig) -> bool + Send + Sync>;

#[derive(Default)]
struct MockState {
    calls: Vec<ScannerCall>,
    received_handlers: Vec<DecodedTextHandler>,
    running: bool,
    stops: usize,
    on_decoded: Option<DecodedTextHandler>,
    on_decode_error: Option<DecodeErrorHandler>,
}

/// In-memory [`CameraScanner`] driven by a script.
///
/// # Example
///
/// ```
/// use checkin_camera_core::StartRejection;
/// use checkin_camera_testing::MockScanner;
///
/// // Reject the first two calls, start on the third.
/// let scanner = MockScanner::rejecting(StartRejection::named("OverconstrainedError", "width"))
///     .succeed_on_call(3);
/// assert_eq!(scanner.call_count(), 0);
/// ```
pub struct MockScanner {
    default_outcome: ScriptedOutcome,
    by_call: HashMap<usize, ScriptedOutcome>,
    rules: Vec<(Rule, ScriptedOutcome)>,
    decoded_on_start: Vec<String>,
    decode_errors_on_start: usize,
    state: Arc<Mutex<MockState>>,
}

impl MockScanner {
    /// A scanner that starts on the first call.
    #[must_use]
    pub fn starting() -> Self {
        Self::with_default(ScriptedOutcome::Start)
    }

    /// A scanner that rejects every call with `rejection` unless scripted otherwise.
    #[must_use]
    pub fn rejecting(rejection: impl Into<StartRejection>) -> Self {
        Self::with_default(ScriptedOutcome::Reject(rejection.into()))
    }

    /// A scanner whose `start` never settles unless scripted otherwise.
    #[must_use]
    pub fn hanging() -> Self {
        Self::with_default(ScriptedOutcome::Hang)
    }

    fn with_default(default_outcome: ScriptedOutcome) -> Self {
        Self {
            default_outcome,
            by_call: HashMap::new(),
            rules: Vec::new(),
            decoded_on_start: Vec::new(),
            decode_errors_on_start: 0,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Answer call number `call` (1-based) with `outcome`.
    #[must_use]
    pub fn outcome_on_call(mut self, call: usize, outcome: ScriptedOutcome) -> Self {
        self.by_call.insert(call, outcome);
        self
    }

    /// Start on call number `call` (1-based).
    #[must_use]
    pub fn succeed_on_call(self, call: usize) -> Self {
        self.outcome_on_call(call, ScriptedOutcome::Start)
    }

    /// Answer every call matching `predicate` with `outcome`.
    #[must_use]
    pub fn when<F>(mut self, predicate: F, outcome: ScriptedOutcome) -> Self
    where
        F: Fn(&DeviceConstraints, &ScanConfig) -> bool + Send + Sync + 'static,
    {
        self.rules.push((Box::new(predicate), outcome));
        self
    }

    /// Start whenever `predicate` matches.
    #[must_use]
    pub fn succeed_when<F>(self, predicate: F) -> Self
    where
        F: Fn(&DeviceConstraints, &ScanConfig) -> bool + Send + Sync + 'static,
    {
        self.when(predicate, ScriptedOutcome::Start)
    }

    /// On a successful start, fire `decode_errors` empty frames and then deliver
    /// each of `payloads`, before resolving.
    #[must_use]
    pub fn emit_on_start(mut self, payloads: &[&str], decode_errors: usize) -> Self {
        self.decoded_on_start = payloads.iter().map(|p| (*p).to_string()).collect();
        self.decode_errors_on_start = decode_errors;
        self
    }

    /// Every `start` call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ScannerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of `start` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// The decoded-text handler passed to each `start` call, in call order.
    #[must_use]
    pub fn received_handlers(&self) -> Vec<DecodedTextHandler> {
        self.state.lock().unwrap().received_handlers.clone()
    }

    /// Whether a `start` succeeded and no `stop` followed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    /// Number of `stop` calls so far.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.state.lock().unwrap().stops
    }

    /// Deliver a decoded payload through the handler of the running start.
    ///
    /// Returns `false` if the scanner is not running.
    pub fn deliver(&self, text: &str) -> bool {
        let handler = {
            let state = self.state.lock().unwrap();
            if !state.running {
                return false;
            }
            state.on_decoded.clone()
        };
        handler.is_some_and(|h| {
            h(text);
            true
        })
    }

    /// Report an empty frame through the handler of the running start.
    ///
    /// Returns `false` if the scanner is not running.
    pub fn deliver_decode_error(&self, message: &str) -> bool {
        let handler = {
            let state = self.state.lock().unwrap();
            if !state.running {
                return false;
            }
            state.on_decode_error.clone()
        };
        handler.is_some_and(|h| {
            h(&DecodeFailure::new(message));
            true
        })
    }

    fn outcome_for(&self, call: usize, constraints: &DeviceConstraints, config: &ScanConfig) -> ScriptedOutcome {
        if let Some(outcome) = self.by_call.get(&call) {
            return outcome.clone();
        }
        self.rules
            .iter()
            .find(|(rule, _)| rule(constraints, config))
            .map_or_else(|| self.default_outcome.clone(), |(_, outcome)| outcome.clone())
    }
}

impl CameraScanner for MockScanner {
    fn start(
        &self,
        constraints: DeviceConstraints,
        config: ScanConfig,
        on_decoded: DecodedTextHandler,
        on_decode_error: DecodeErrorHandler,
    ) -> ScannerFuture<'_> {
        let call = {
            let mut state = self.state.lock().unwrap();
            let call = state.calls.len() + 1;
            state.calls.push(ScannerCall {
                call,
                constraints: constraints.clone(),
                config: config.clone(),
            });
            state.received_handlers.push(Arc::clone(&on_decoded));
            call
        };
        let outcome = self.outcome_for(call, &constraints, &config);

        Box::pin(async move {
            match outcome {
                ScriptedOutcome::Start => {
                    {
                        let mut state = self.state.lock().unwrap();
                        state.running = true;
                        state.on_decoded = Some(Arc::clone(&on_decoded));
                        state.on_decode_error = Some(Arc::clone(&on_decode_error));
                    }
                    for _ in 0..self.decode_errors_on_start {
                        on_decode_error(&DecodeFailure::new("No QR code found"));
                    }
                    for payload in &self.decoded_on_start {
                        on_decoded(payload);
                    }
                    Ok(())
                }
                ScriptedOutcome::Reject(rejection) => Err(rejection),
                ScriptedOutcome::Hang => std::future::pending().await,
            }
        })
    }

    fn stop(&self) -> ScannerFuture<'_> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.running = false;
            state.stops += 1;
            state.on_decoded = None;
            state.on_decode_error = None;
            Ok(())
        })
    }
}

impl std::fmt::Debug for MockScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockScanner")
            .field("default_outcome", &self.default_outcome)
            .field("by_call", &self.by_call)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}
