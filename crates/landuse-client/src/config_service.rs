//! Loading [`ClientConfig`] from disk and the environment.
//!
//! The default location is `~/.config/landuse/config.toml`. A missing or empty
//! file yields the defaults; a file that exists but does not parse is an error.

use landuse_core::error::{LanduseError, Result};
use landuse_core::ClientConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ENV_BASE_URL: &str = "LANDUSE_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "LANDUSE_REQUEST_TIMEOUT_SECS";

/// Resolves and reads the client configuration file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
}

impl ConfigService {
    /// Uses the platform config directory.
    pub fn new() -> Self {
        Self {
            path: default_config_path(),
        }
    }

    /// Uses an explicit file instead of the platform location.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads the file and applies environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let config = self.load_file()?;
        let config = apply_overrides(config, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the file only.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the file exists but cannot be read or is
    /// not a valid configuration.
    pub fn load_file(&self) -> Result<ClientConfig> {
        let Some(path) = &self.path else {
            debug!("No config directory available, using defaults");
            return Ok(ClientConfig::default());
        };
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            LanduseError::config(format!("Failed to read config file at {:?}: {}", path, e))
        })?;
        if content.trim().is_empty() {
            return Ok(ClientConfig::default());
        }

        let config = ClientConfig::from_toml_str(&content).map_err(|e| {
            LanduseError::config(format!("Invalid config file at {:?}: {}", path, e))
        })?;
        info!(path = %path.display(), base_url = %config.base_url, "Loaded client config");
        Ok(config)
    }

    /// Writes `config` to the file, creating parent directories.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| LanduseError::config("Cannot determine config directory"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LanduseError::config(format!("Failed to create {:?}: {}", parent, e))
            })?;
        }
        let content = toml::to_string_pretty(config)
            .map_err(|e| LanduseError::config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| LanduseError::config(format!("Failed to write {:?}: {}", path, e)))
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// `~/.config/landuse/config.toml` on Linux, the platform equivalent elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("landuse").join("config.toml"))
}

/// Overlays variables found through `lookup` onto `config`.
pub fn apply_overrides<F>(mut config: ClientConfig, lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.base_url = url.trim().to_string();
    }
    if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
        config.request_timeout_secs = raw.trim().parse().map_err(|_| {
            LanduseError::config(format!(
                "{} must be a whole number of seconds, got '{}'",
                ENV_REQUEST_TIMEOUT_SECS, raw
            ))
        })?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(dir.path().join("config.toml"));
        assert_eq!(service.load_file().unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = \"http://backend:9000\"\npoll_interval_ms = 50\n").unwrap();

        let config = ConfigService::with_path(&path).load_file().unwrap();
        assert_eq!(config.base_url, "http://backend:9000");
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = [").unwrap();

        let err = ConfigService::with_path(&path).load_file().unwrap_err();
        assert!(matches!(err, LanduseError::Config(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(dir.path().join("nested").join("config.toml"));
        let mut config = ClientConfig::with_base_url("https://landuse.example.org");
        config.max_poll_attempts = 7;

        service.save(&config).unwrap();
        assert_eq!(service.load_file().unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_overrides(
            ClientConfig::default(),
            env(&[
                (ENV_BASE_URL, " http://override:1234 "),
                (ENV_REQUEST_TIMEOUT_SECS, "5"),
            ]),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://override:1234");
        assert_eq!(config.request_timeout_secs, 5);

        let untouched = apply_overrides(ClientConfig::default(), env(&[])).unwrap();
        assert_eq!(untouched, ClientConfig::default());
    }

    #[test]
    fn test_bad_timeout_override_rejected() {
        let err = apply_overrides(
            ClientConfig::default(),
            env(&[(ENV_REQUEST_TIMEOUT_SECS, "soon")]),
        )
        .unwrap_err();
        assert!(matches!(err, LanduseError::Config(_)));
    }
}
