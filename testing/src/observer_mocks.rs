//! Observer that keeps everything it is told.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use checkin_camera_core::{AttemptContext, AttemptRecord, NegotiationResult};
use checkin_camera_runtime::NegotiationObserver;
use std::sync::{Arc, Mutex};

/// One observer notification.
#[derive(Debug, Clone)]
pub enum ObservedEvent {
    /// `no_constraint_bases`
    NoConstraintBases,
    /// `attempt_started`
    AttemptStarted(AttemptContext),
    /// `attempt_failed`
    AttemptFailed(AttemptRecord),
    /// `started`
    Started(NegotiationResult),
    /// `exhausted`
    Exhausted(Vec<AttemptRecord>),
}

/// Records notifications in order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<ObservedEvent>>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification so far.
    #[must_use]
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// `(base_index, preset label)` of every attempt started, in order.
    #[must_use]
    pub fn attempt_order(&self) -> Vec<(usize, String)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                ObservedEvent::AttemptStarted(ctx) => Some((ctx.base_index, ctx.preset.label.clone())),
                _ => None,
            })
            .collect()
    }

    /// Failed attempts, in order.
    #[must_use]
    pub fn failures(&self) -> Vec<AttemptRecord> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                ObservedEvent::AttemptFailed(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ObservedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl NegotiationObserver for RecordingObserver {
    fn no_constraint_bases(&self) {
        self.push(ObservedEvent::NoConstraintBases);
    }

    fn attempt_started(&self, context: &AttemptContext) {
        self.push(ObservedEvent::AttemptStarted(context.clone()));
    }

    fn attempt_failed(&self, record: &AttemptRecord) {
        self.push(ObservedEvent::AttemptFailed(record.clone()));
    }

    fn started(&self, result: &NegotiationResult) {
        self.push(ObservedEvent::Started(result.clone()));
    }

    fn exhausted(&self, attempts: &[AttemptRecord]) {
        self.push(ObservedEvent::Exhausted(attempts.to_vec()));
    }
}
