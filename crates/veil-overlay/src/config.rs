#![forbid(unsafe_code)]

//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default lock window after a show or hide starts.
pub const DEFAULT_LOCK_DURATION: Duration = Duration::from_millis(300);

/// Engine-wide settings.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use veil_overlay::OverlayConfig;
///
/// let config = OverlayConfig::default().lock_duration(Duration::from_millis(150));
/// assert_eq!(config.lock_duration, Duration::from_millis(150));
///
/// let parsed = OverlayConfig::from_json(r#"{ "lock_duration_ms": 500 }"#).unwrap();
/// assert_eq!(parsed.lock_duration, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// How long new shows (and non-bypassing hides) are rejected after one
    /// starts. Independent of transition length.
    #[serde(rename = "lock_duration_ms", with = "millis")]
    pub lock_duration: Duration,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            lock_duration: DEFAULT_LOCK_DURATION,
        }
    }
}

impl OverlayConfig {
    /// Set the lock window.
    #[must_use]
    pub fn lock_duration(mut self, duration: Duration) -> Self {
        self.lock_duration = duration;
        self
    }

    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
