//! The camera-scanner capability the negotiator drives.
//!
//! A [`CameraScanner`] owns the camera device and the decoder. Starting it either
//! acquires the device and begins continuous decoding (`Ok(())`), or rejects with
//! a [`StartRejection`]. Implementations must reject cleanly: a failed `start`
//! must not keep the device held, because the negotiator immediately tries the
//! next configuration without any cleanup of its own.
//!
//! # Dyn Compatibility
//!
//! The trait returns `Pin<Box<dyn Future>>` instead of using `async fn` so that
//! scanners can be stored as `Arc<dyn CameraScanner>`.

use crate::constraints::{DeviceConstraints, ScanConfig};
use crate::rejection::StartRejection;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by scanner operations.
pub type ScannerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), StartRejection>> + Send + 'a>>;

/// Called with every successfully decoded payload.
pub type DecodedTextHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Called whenever a frame yields no payload.
pub type DecodeErrorHandler = Arc<dyn Fn(&DecodeFailure) + Send + Sync>;

/// A frame that produced no decodable payload.
///
/// This fires continuously while the camera is pointed at anything that is not
/// a QR code. It is not a failure of the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    /// Decoder message, e.g. `No MultiFormat Readers were able to detect the code.`
    pub message: String,
}

impl DecodeFailure {
    /// Create a decode failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Camera acquisition plus continuous decoding.
pub trait CameraScanner: Send + Sync {
    /// Acquire a camera matching `constraints` and start decoding with `config`.
    ///
    /// Resolves once the camera is running. From then on `on_decoded` is called
    /// for every payload and `on_decode_error` for every empty frame, until
    /// [`stop`](Self::stop) is called.
    ///
    /// # Errors
    ///
    /// Rejects when the constraints cannot be satisfied, the user denied
    /// access, or the device is busy. The device must be released before the
    /// rejection is returned.
    fn start(
        &self,
        constraints: DeviceConstraints,
        config: ScanConfig,
        on_decoded: DecodedTextHandler,
        on_decode_error: DecodeErrorHandler,
    ) -> ScannerFuture<'_>;

    /// Stop decoding and release the camera.
    ///
    /// Must be callable at any time, including while a `start` is still in
    /// flight, so that callers can cancel a negotiation by tearing down the
    /// scanner.
    ///
    /// # Errors
    ///
    /// Returns a rejection if the platform fails to release the device.
    fn stop(&self) -> ScannerFuture<'_>;
}

impl<S: CameraScanner + ?Sized> CameraScanner for Arc<S> {
    fn start(
        &self,
        constraints: DeviceConstraints,
        config: ScanConfig,
        on_decoded: DecodedTextHandler,
        on_decode_error: DecodeErrorHandler,
    ) -> ScannerFuture<'_> {
        (**self).start(constraints, config, on_decoded, on_decode_error)
    }

    fn stop(&self) -> ScannerFuture<'_> {
        (**self).stop()
    }
}

/// A decode-error handler that does nothing.
#[must_use]
pub fn ignore_decode_errors() -> DecodeErrorHandler {
    Arc::new(|_: &DecodeFailure| {})
}
