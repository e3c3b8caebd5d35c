//! Negotiator configuration.
//!
//! Loaded from environment variables, deserialized from a config file, or put
//! together with [`NegotiatorConfig::builder`].
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `CAMERA_QUALITY_LADDER` | Comma-separated preset labels, best first | default ladder |
//! | `CAMERA_START_TIMEOUT_MS` | Per-attempt timeout in milliseconds, `0` disables | none |

use checkin_camera_core::QualityPreset;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::time::Duration;

/// Environment variable holding the preset ladder.
pub const LADDER_ENV: &str = "CAMERA_QUALITY_LADDER";
/// Environment variable holding the per-attempt timeout.
pub const TIMEOUT_ENV: &str = "CAMERA_START_TIMEOUT_MS";

/// How the negotiator walks the ladder.
///
/// # Default Values
///
/// - `presets`: [`QualityPreset::default_ladder`]
/// - `attempt_timeout`: none, a `start` call may take as long as it likes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiatorConfig {
    /// Presets tried for each constraint base, best first.
    pub presets: Vec<QualityPreset>,
    /// Upper bound on a single `start` call.
    #[serde(
        rename = "attempt_timeout_ms",
        serialize_with = "serialize_timeout_ms",
        deserialize_with = "deserialize_timeout_ms"
    )]
    pub attempt_timeout: Option<Duration>,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            presets: QualityPreset::default_ladder(),
            attempt_timeout: None,
        }
    }
}

impl NegotiatorConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub const fn builder() -> NegotiatorConfigBuilder {
        NegotiatorConfigBuilder {
            presets: None,
            attempt_timeout: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Values that fail to parse are logged and replaced with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let presets = match env::var(LADDER_ENV) {
            Ok(raw) => match QualityPreset::parse_ladder(&raw) {
                Ok(presets) if !presets.is_empty() => presets,
                Ok(_) => {
                    tracing::warn!(var = LADDER_ENV, "Empty preset ladder, using default");
                    QualityPreset::default_ladder()
                }
                Err(e) => {
                    tracing::warn!(var = LADDER_ENV, error = %e, "Invalid preset ladder, using default");
                    QualityPreset::default_ladder()
                }
            },
            Err(_) => QualityPreset::default_ladder(),
        };

        let attempt_timeout = env::var(TIMEOUT_ENV).ok().and_then(|raw| {
            raw.trim().parse::<u64>().map_or_else(
                |e| {
                    tracing::warn!(var = TIMEOUT_ENV, value = %raw, error = %e, "Invalid timeout, disabling");
                    None
                },
                timeout_from_ms,
            )
        });

        Self {
            presets,
            attempt_timeout,
        }
    }
}

/// Builder for [`NegotiatorConfig`].
#[derive(Debug, Clone)]
pub struct NegotiatorConfigBuilder {
    presets: Option<Vec<QualityPreset>>,
    attempt_timeout: Option<Duration>,
}

impl NegotiatorConfigBuilder {
    /// Replace the preset ladder.
    #[must_use]
    pub fn presets(mut self, presets: Vec<QualityPreset>) -> Self {
        self.presets = Some(presets);
        self
    }

    /// Bound each `start` call.
    #[must_use]
    pub const fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> NegotiatorConfig {
        NegotiatorConfig {
            presets: self.presets.unwrap_or_else(QualityPreset::default_ladder),
            attempt_timeout: self.attempt_timeout,
        }
    }
}

const fn timeout_from_ms(ms: u64) -> Option<Duration> {
    if ms == 0 {
        None
    } else {
        Some(Duration::from_millis(ms))
    }
}

#[allow(clippy::ref_option)] // serde's serialize_with hands us &Option<T>
fn serialize_timeout_ms<S: Serializer>(
    timeout: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timeout {
        Some(t) => serializer.serialize_some(&u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_timeout_ms<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Duration>, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.and_then(timeout_from_ms))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NegotiatorConfig::default();
        assert_eq!(config.presets, QualityPreset::default_ladder());
        assert_eq!(config.attempt_timeout, None);
    }

    #[test]
    fn test_builder() {
        let config = NegotiatorConfig::builder()
            .presets(QualityPreset::parse_ladder("720p@30,720p@15").unwrap())
            .attempt_timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.presets.len(), 2);
        assert_eq!(config.attempt_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_deserialize_from_labels() {
        let config: NegotiatorConfig = serde_json::from_str(
            r#"{"presets": ["1080p@30", "720p@15"], "attempt_timeout_ms": 2500}"#,
        )
        .unwrap();

        assert_eq!(config.presets[0].width, Some(1920));
        assert_eq!(config.attempt_timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_deserialize_missing_fields_use_defaults() {
        let config: NegotiatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, NegotiatorConfig::default());
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config: NegotiatorConfig =
            serde_json::from_str(r#"{"attempt_timeout_ms": 0}"#).unwrap();
        assert_eq!(config.attempt_timeout, None);
    }

    #[test]
    fn test_serialize_roundtrips_timeout() {
        let config = NegotiatorConfig::builder()
            .attempt_timeout(Duration::from_millis(750))
            .build();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["attempt_timeout_ms"], 750);
    }
}
