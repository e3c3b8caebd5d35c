//! # Check-in Camera Core
//!
//! Types and the scanner capability used to start the attendee check-in camera.
//!
//! Starting a camera for QR scanning is a negotiation: the best resolution a
//! phone advertises is not always one it can actually deliver, and the rear
//! camera is not always present. The runtime crate walks a ladder of
//! (constraint base × quality preset) combinations until one starts. This crate
//! holds what that walk is made of:
//!
//! - [`constraints`]: device constraints and scan configuration
//! - [`preset`]: quality presets and the default ladder
//! - [`scanner`]: the [`CameraScanner`] capability
//! - [`rejection`]: scanner rejections and their normalization
//! - [`attempt`]: attempt records and the negotiation result
//! - [`error`]: terminal negotiation errors
//!
//! ## Example
//!
//! ```
//! use checkin_camera_core::{DeviceConstraints, FacingMode, QualityPreset, ScanConfig};
//!
//! let base = DeviceConstraints::facing(FacingMode::Environment);
//! let ladder = QualityPreset::default_ladder();
//! let first = base.with_preset(&ladder[0]);
//! let config = ScanConfig::new(10).with_fps(ladder[0].fps);
//!
//! assert_eq!(first.ideal_width(), Some(3840));
//! assert_eq!(config.fps, 30);
//! ```

pub mod attempt;
pub mod constraints;
pub mod error;
pub mod preset;
pub mod rejection;
pub mod scanner;

pub use attempt::{AttemptContext, AttemptRecord, NegotiationResult};
pub use constraints::{ConstraintBase, DeviceConstraints, FacingMode, ScanConfig};
pub use error::NegotiationError;
pub use preset::{PresetParseError, QualityPreset};
pub use rejection::{NormalizedError, RejectionPayload, StartRejection};
pub use scanner::{
    CameraScanner, DecodeErrorHandler, DecodeFailure, DecodedTextHandler, ScannerFuture,
    ignore_decode_errors,
};
