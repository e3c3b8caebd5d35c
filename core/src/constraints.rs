//! Device constraints and scan configuration handed to a [`CameraScanner`](crate::scanner::CameraScanner).
//!
//! Both types wrap an ordered JSON object so that fields the negotiator does not
//! know about pass through untouched. The negotiator only ever writes
//! `width`/`height` on constraints and `fps` on the scan configuration.

use crate::preset::QualityPreset;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// Which way the camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera (towards the operator).
    User,
    /// Rear camera (towards the attendee's ticket).
    Environment,
}

impl FacingMode {
    /// Wire name of the facing mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device-selection descriptor, optionally carrying resolution hints.
///
/// Constraint bases supplied by callers use the same type; see [`ConstraintBase`].
///
/// # Example
///
/// ```
/// use checkin_camera_core::constraints::{DeviceConstraints, FacingMode};
/// use checkin_camera_core::preset::QualityPreset;
///
/// let base = DeviceConstraints::facing(FacingMode::Environment);
/// let preset: QualityPreset = "1080p@30".parse().unwrap();
/// let effective = base.with_preset(&preset);
///
/// assert_eq!(effective.ideal_width(), Some(1920));
/// assert_eq!(effective.ideal_height(), Some(1080));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceConstraints(Map<String, Value>);

/// Caller-supplied constraint base (e.g. "prefer the rear camera").
pub type ConstraintBase = DeviceConstraints;

impl DeviceConstraints {
    /// Empty constraints: any camera, any resolution.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Constraints preferring the given facing mode.
    #[must_use]
    pub fn facing(mode: FacingMode) -> Self {
        Self::new().with_field("facingMode", json!(mode.as_str()))
    }

    /// Constraints requiring the given facing mode.
    #[must_use]
    pub fn facing_exact(mode: FacingMode) -> Self {
        Self::new().with_field("facingMode", json!({ "exact": mode.as_str() }))
    }

    /// Constraints pinned to a specific device id.
    #[must_use]
    pub fn device_id(id: impl Into<String>) -> Self {
        Self::new().with_field("deviceId", json!({ "exact": id.into() }))
    }

    /// Set an arbitrary field, replacing any previous value under that key.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Merge a quality preset into these constraints.
    ///
    /// When the preset has dimensions, `width` and `height` are set to
    /// `{ideal: N}`, overriding whatever the base carried. Presets without
    /// dimensions leave the constraints as they are.
    #[must_use]
    pub fn with_preset(&self, preset: &QualityPreset) -> Self {
        let mut merged = self.clone();
        if let Some(width) = preset.width {
            merged.0.insert("width".to_string(), json!({ "ideal": width }));
        }
        if let Some(height) = preset.height {
            merged.0.insert("height".to_string(), json!({ "ideal": height }));
        }
        merged
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Ideal width, if one was requested.
    #[must_use]
    pub fn ideal_width(&self) -> Option<u32> {
        self.ideal("width")
    }

    /// Ideal height, if one was requested.
    #[must_use]
    pub fn ideal_height(&self) -> Option<u32> {
        self.ideal("height")
    }

    fn ideal(&self, key: &str) -> Option<u32> {
        self.0
            .get(key)?
            .get("ideal")?
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for DeviceConstraints {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl fmt::Display for DeviceConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Map<String, Value> always serializes.
        match serde_json::to_string(&self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

const FPS_KEY: &str = "fps";

/// Scanner configuration for one start attempt.
///
/// Only `fps` is owned by the negotiator; every other field is the caller's and
/// is forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Decode attempts per second.
    pub fps: u32,
    /// Remaining caller options (`qrbox`, `aspectRatio`, ...).
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            options: Map::new(),
        }
    }
}

impl ScanConfig {
    /// Create a configuration with the given frame rate and no extra options.
    #[must_use]
    pub fn new(fps: u32) -> Self {
        Self {
            fps,
            options: Map::new(),
        }
    }

    /// Set a caller option.
    ///
    /// An `"fps"` key sets [`ScanConfig::fps`] instead of landing in
    /// `options`; a value that is not a `u32` is discarded.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if key == FPS_KEY {
            if let Some(fps) = value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                self.fps = fps;
            }
        } else {
            self.options.insert(key, value);
        }
        self
    }

    /// Copy of this configuration with only `fps` replaced.
    ///
    /// A stray `"fps"` entry in `options` is dropped so the serialized form
    /// carries a single frame rate.
    #[must_use]
    pub fn with_fps(&self, fps: u32) -> Self {
        let mut options = self.options.clone();
        options.remove(FPS_KEY);
        Self { fps, options }
    }
}

impl fmt::Display for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_overrides_base_dimensions() {
        let base = DeviceConstraints::facing(FacingMode::Environment)
            .with_field("width", json!({ "min": 640 }));
        let preset = QualityPreset::new("720p@30", Some(1280), Some(720), 30);

        let merged = base.with_preset(&preset);

        assert_eq!(merged.get("width"), Some(&json!({ "ideal": 1280 })));
        assert_eq!(merged.get("height"), Some(&json!({ "ideal": 720 })));
        assert_eq!(merged.get("facingMode"), Some(&json!("environment")));
        // Base is not mutated.
        assert_eq!(base.get("width"), Some(&json!({ "min": 640 })));
    }

    #[test]
    fn test_preset_without_dimensions_leaves_base_alone() {
        let base = DeviceConstraints::device_id("cam-1");
        let preset = QualityPreset::new("auto@15", None, None, 15);

        assert_eq!(base.with_preset(&preset), base);
    }

    #[test]
    fn test_facing_exact_shape() {
        let c = DeviceConstraints::facing_exact(FacingMode::User);
        assert_eq!(c.to_string(), r#"{"facingMode":{"exact":"user"}}"#);
    }

    #[test]
    fn test_with_fps_keeps_options() {
        let config = ScanConfig::new(10)
            .with_option("qrbox", json!(250))
            .with_option("disableFlip", json!(true));

        let updated = config.with_fps(30);

        assert_eq!(updated.fps, 30);
        assert_eq!(updated.options, config.options);
    }

    #[test]
    fn test_fps_option_cannot_shadow_frame_rate() {
        let config = ScanConfig::new(10)
            .with_option("fps", json!(5))
            .with_option("qrbox", json!(250));
        assert_eq!(config.fps, 5);
        assert!(!config.options.contains_key("fps"));

        let mut smuggled = config.clone();
        smuggled.options.insert("fps".into(), json!(5));
        let updated = smuggled.with_fps(30);

        assert_eq!(updated.to_string(), r#"{"fps":30,"qrbox":250}"#);
        let back: ScanConfig = serde_json::from_str(&updated.to_string()).unwrap();
        assert_eq!(back.fps, 30);
    }

    #[test]
    fn test_non_numeric_fps_option_is_discarded() {
        let config = ScanConfig::new(10).with_option("fps", json!("fast"));
        assert_eq!(config.fps, 10);
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_scan_config_flattens_options() {
        let config = ScanConfig::new(15).with_option("qrbox", json!(250));
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value, json!({ "fps": 15, "qrbox": 250 }));

        let back: ScanConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }
}
