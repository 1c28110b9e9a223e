//! Configuration types for the splash startup flow.

use crate::error::{Result, StartupError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for the startup handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Debounce before the initialization task fires, in milliseconds.
    ///
    /// Absorbs rapid resume/pause churn (e.g. rotation) so the engine is
    /// only started once the splash screen has settled.
    pub init_delay_ms: u64,
    /// Splash theme name (`"default"` or `"night"`).
    pub theme: String,
    /// Default tracing filter when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Component that receives the forwarded launch request.
    pub destination: String,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            init_delay_ms: 100,
            theme: "default".to_owned(),
            log_filter: "info".to_owned(),
            destination: "DownloadResources".to_owned(),
        }
    }
}

impl StartupConfig {
    /// The configured debounce as a [`Duration`].
    #[must_use]
    pub fn init_delay(&self) -> Duration {
        Duration::from_millis(self.init_delay_ms)
    }

    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| StartupError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| StartupError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `config_dir()/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::app_dirs::config_file()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = StartupConfig::default();
        assert_eq!(config.init_delay(), Duration::from_millis(100));
        assert_eq!(config.theme, "default");
        assert!(!config.destination.is_empty());
        assert!(!config.log_filter.is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let config = StartupConfig {
            init_delay_ms: 250,
            theme: "night".to_owned(),
            ..StartupConfig::default()
        };
        config.save_to_file(&path).expect("save config");
        assert!(path.exists());

        let loaded = StartupConfig::from_file(&path).expect("load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: StartupConfig = toml::from_str("theme = \"night\"\n").unwrap();
        assert_eq!(config.theme, "night");
        assert_eq!(config.init_delay_ms, 100);
        assert_eq!(config.destination, "DownloadResources");
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = StartupConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(StartupError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "init_delay_ms = \"soon\"").unwrap();
        let result = StartupConfig::from_file(&path);
        assert!(matches!(result, Err(StartupError::Config(_))));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        assert!(StartupConfig::default_config_path().ends_with("config.toml"));
    }
}
