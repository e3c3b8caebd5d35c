//! # Check-in Camera Runtime
//!
//! Starts the check-in camera by walking a ladder of device constraints and
//! quality presets until the scanner accepts one.
//!
//! ## Core Components
//!
//! - **`CameraStartNegotiator`**: the ladder walk itself
//! - **`NegotiationObserver`**: diagnostics sink, `tracing`-backed by default
//! - **`NegotiatorConfig`**: preset ladder and optional per-attempt timeout
//! - **`metrics`**: counters and histograms through the `metrics` facade
//!
//! ## Example
//!
//! ```ignore
//! use checkin_camera_runtime::{negotiate, NegotiateParams};
//!
//! let result = negotiate(&scanner, NegotiateParams::new(bases, on_decoded)).await?;
//! tracing::info!(preset = %result.chosen_preset, "scanning");
//! ```

/// Negotiator configuration
pub mod config;

/// Negotiation metrics
pub mod metrics;

/// The camera-start ladder
pub mod negotiator;

/// Diagnostics observers
pub mod observer;

pub use config::{NegotiatorConfig, NegotiatorConfigBuilder};
pub use negotiator::{CameraStartNegotiator, NegotiateParams, negotiate};
pub use observer::{NegotiationObserver, NoopObserver, TracingObserver};
