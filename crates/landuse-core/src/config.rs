//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{LanduseError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

/// Explicit configuration handed to every client component at construction.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout enforced by the transport.
    pub request_timeout_secs: u64,
    /// Delay between job status polls.
    pub poll_interval_ms: u64,
    /// Polls before a waiting caller gives up.
    pub max_poll_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

impl ClientConfig {
    /// Creates a config for `base_url` with default timings.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values are usable.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error for an empty or non-HTTP base URL, a zero
    /// timeout, a zero poll interval or a zero poll limit.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(LanduseError::config("base_url must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LanduseError::config(format!(
                "base_url must start with http:// or https://, got '{url}'"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(LanduseError::config("request_timeout_secs must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(LanduseError::config("poll_interval_ms must be positive"));
        }
        if self.max_poll_attempts == 0 {
            return Err(LanduseError::config("max_poll_attempts must be positive"));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str("base_url = \"https://lulc.example.org/\"\n").unwrap();
        assert_eq!(config.normalized_base_url(), "https://lulc.example.org");
        assert_eq!(config.max_poll_attempts, DEFAULT_MAX_POLL_ATTEMPTS);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ClientConfig::from_toml_str("request_timeout_secs = 0").unwrap_err();
        assert!(matches!(err, LanduseError::Config(_)));

        let err = ClientConfig::from_toml_str("base_url = \"ftp://nope\"").unwrap_err();
        assert!(matches!(err, LanduseError::Config(_)));

        let err = ClientConfig::from_toml_str("poll_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, LanduseError::Config(_)));
    }
}
