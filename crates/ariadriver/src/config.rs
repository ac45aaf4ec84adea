//! Driver configuration.
//!
//! ```yaml
//! patience_ms: 1000
//! poll_interval_ms: 10
//! ```

use crate::result::{AriaError, AriaResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default patience (1 second)
pub const DEFAULT_PATIENCE_MS: u64 = DEFAULT_WAIT_TIMEOUT_MS;

/// Settings fixed for the lifetime of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DriverConfig {
    /// How long polling operations wait for their post-condition
    #[serde(rename = "patience_ms", with = "millis")]
    pub patience: Duration,
    /// Delay between polls
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            patience: Duration::from_millis(DEFAULT_PATIENCE_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl DriverConfig {
    /// Create default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set patience
    #[must_use]
    pub const fn with_patience(mut self, patience: Duration) -> Self {
        self.patience = patience;
        self
    }

    /// Set patience in milliseconds
    #[must_use]
    pub const fn with_patience_ms(mut self, ms: u64) -> Self {
        self.patience = Duration::from_millis(ms);
        self
    }

    /// Set poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Parse YAML configuration
    pub fn from_yaml(yaml: &str) -> AriaResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| AriaError::Config {
            message: e.to_string(),
        })
    }

    /// Load YAML configuration from a file
    pub fn load(path: impl AsRef<Path>) -> AriaResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| AriaError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_yaml(&yaml)
    }

    /// Wait options derived from this config
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.patience.as_millis() as u64)
            .with_poll_interval(self.poll_interval.as_millis() as u64)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
