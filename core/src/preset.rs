//! Quality presets: named resolution + frame-rate pairs tried as a unit.
//!
//! Presets are written as `<resolution>@<fps>`, for example `1080p@30`,
//! `4K@30`, `1280x720@15` or `auto@10` (no resolution hint).

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a preset label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetParseError {
    /// The label has no `@<fps>` suffix.
    #[error("Preset label '{0}' is missing '@<fps>'")]
    MissingFrameRate(String),
    /// The resolution part is not recognized.
    #[error("Unknown resolution '{resolution}' in preset label '{label}'")]
    UnknownResolution {
        /// Full label being parsed.
        label: String,
        /// The resolution fragment that failed.
        resolution: String,
    },
    /// The frame rate is not a positive integer.
    #[error("Invalid frame rate '{fps}' in preset label '{label}'")]
    InvalidFrameRate {
        /// Full label being parsed.
        label: String,
        /// The frame-rate fragment that failed.
        fps: String,
    },
}

/// One desired capture quality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QualityPreset {
    /// Human-readable label, e.g. `1080p@30`.
    pub label: String,
    /// Ideal capture width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Ideal capture height in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Frames per second handed to the scanner.
    pub fps: u32,
}

impl QualityPreset {
    /// Create a preset from its parts.
    #[must_use]
    pub fn new(label: impl Into<String>, width: Option<u32>, height: Option<u32>, fps: u32) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            fps,
        }
    }

    /// The standard ladder, highest quality first.
    ///
    /// `4K@30 → 1440p@30 → 1080p@30 → 720p@30 → 1080p@15 → 720p@15`
    #[must_use]
    pub fn default_ladder() -> Vec<Self> {
        vec![
            Self::new("4K@30", Some(3840), Some(2160), 30),
            Self::new("1440p@30", Some(2560), Some(1440), 30),
            Self::new("1080p@30", Some(1920), Some(1080), 30),
            Self::new("720p@30", Some(1280), Some(720), 30),
            Self::new("1080p@15", Some(1920), Some(1080), 15),
            Self::new("720p@15", Some(1280), Some(720), 15),
        ]
    }

    /// Parse a comma-separated list of labels, e.g. `"1080p@30, 720p@15"`.
    ///
    /// # Errors
    ///
    /// Returns the first [`PresetParseError`] encountered.
    pub fn parse_ladder(s: &str) -> Result<Vec<Self>, PresetParseError> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Whether the preset carries a resolution hint.
    #[must_use]
    pub const fn has_dimensions(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}

fn named_resolution(name: &str) -> Option<(u32, u32)> {
    match name.to_ascii_lowercase().as_str() {
        "4k" | "2160p" => Some((3840, 2160)),
        "1440p" => Some((2560, 1440)),
        "1080p" => Some((1920, 1080)),
        "720p" => Some((1280, 720)),
        "480p" => Some((640, 480)),
        _ => None,
    }
}

impl FromStr for QualityPreset {
    type Err = PresetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let (resolution, fps_part) = label
            .rsplit_once('@')
            .ok_or_else(|| PresetParseError::MissingFrameRate(label.to_string()))?;

        let fps = fps_part
            .parse::<u32>()
            .ok()
            .filter(|fps| *fps > 0)
            .ok_or_else(|| PresetParseError::InvalidFrameRate {
                label: label.to_string(),
                fps: fps_part.to_string(),
            })?;

        let unknown = || PresetParseError::UnknownResolution {
            label: label.to_string(),
            resolution: resolution.to_string(),
        };

        let (width, height) = if resolution.eq_ignore_ascii_case("auto") {
            (None, None)
        } else if let Some((w, h)) = named_resolution(resolution) {
            (Some(w), Some(h))
        } else {
            let (w, h) = resolution.split_once(['x', 'X']).ok_or_else(unknown)?;
            let w = w.parse::<u32>().map_err(|_| unknown())?;
            let h = h.parse::<u32>().map_err(|_| unknown())?;
            (Some(w), Some(h))
        };

        Ok(Self::new(label, width, height, fps))
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Presets deserialize either from a label string or from a full object.
#[derive(Deserialize)]
#[serde(untagged)]
enum PresetRepr {
    Label(String),
    Full {
        label: String,
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
        fps: u32,
    },
}

impl<'de> Deserialize<'de> for QualityPreset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match PresetRepr::deserialize(deserializer)? {
            PresetRepr::Label(label) => label.parse().map_err(serde::de::Error::custom),
            PresetRepr::Full {
                label,
                width,
                height,
                fps,
            } => Ok(Self::new(label, width, height, fps)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_ladder_order() {
        let labels: Vec<_> = QualityPreset::default_ladder()
            .into_iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(
            labels,
            ["4K@30", "1440p@30", "1080p@30", "720p@30", "1080p@15", "720p@15"]
        );
    }

    #[test]
    fn test_default_ladder_labels_parse_back() {
        for preset in QualityPreset::default_ladder() {
            let parsed: QualityPreset = preset.label.parse().unwrap();
            assert_eq!(parsed, preset);
        }
    }

    #[test]
    fn test_parse_explicit_dimensions() {
        let preset: QualityPreset = "1280x960@24".parse().unwrap();
        assert_eq!(preset.width, Some(1280));
        assert_eq!(preset.height, Some(960));
        assert_eq!(preset.fps, 24);
    }

    #[test]
    fn test_parse_auto_has_no_dimensions() {
        let preset: QualityPreset = "auto@10".parse().unwrap();
        assert!(!preset.has_dimensions());
        assert_eq!(preset.fps, 10);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "1080p".parse::<QualityPreset>(),
            Err(PresetParseError::MissingFrameRate("1080p".to_string()))
        );
        assert!(matches!(
            "8K@30".parse::<QualityPreset>(),
            Err(PresetParseError::UnknownResolution { .. })
        ));
        assert!(matches!(
            "720p@0".parse::<QualityPreset>(),
            Err(PresetParseError::InvalidFrameRate { .. })
        ));
    }

    #[test]
    fn test_parse_ladder_skips_blank_entries() {
        let ladder = QualityPreset::parse_ladder(" 1080p@30, ,720p@15 ").unwrap();
        assert_eq!(ladder.len(), 2);
        assert_eq!(ladder[1].label, "720p@15");
    }

    #[test]
    fn test_deserialize_label_or_object() {
        let ladder: Vec<QualityPreset> = serde_json::from_str(
            r#"["720p@30", {"label": "custom", "width": 800, "height": 600, "fps": 20}]"#,
        )
        .unwrap();
        assert_eq!(ladder[0].width, Some(1280));
        assert_eq!(ladder[1], QualityPreset::new("custom", Some(800), Some(600), 20));
    }

    proptest! {
        #[test]
        fn prop_dimension_labels_parse(w in 1u32..10_000, h in 1u32..10_000, fps in 1u32..240) {
            let preset: QualityPreset = format!("{w}x{h}@{fps}").parse().unwrap();
            prop_assert_eq!(preset.width, Some(w));
            prop_assert_eq!(preset.height, Some(h));
            prop_assert_eq!(preset.fps, fps);
        }
    }
}
