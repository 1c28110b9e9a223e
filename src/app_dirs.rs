//! Centralized application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Config | `~/Library/Application Support/coldstart/` | `~/.config/coldstart/` |
//!
//! Set `COLDSTART_CONFIG_DIR` to override [`config_dir`] for tests or
//! custom deployments.

use std::path::PathBuf;

/// Environment variable that overrides [`config_dir`].
pub const CONFIG_DIR_ENV: &str = "COLDSTART_CONFIG_DIR";

/// Application config directory.
///
/// Holds `config.toml` and `launch_state.toml`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("coldstart"))
        .unwrap_or_else(|| PathBuf::from("/tmp/coldstart-config"))
}

/// Path to the startup configuration file (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Path to the persisted launch flags (`config_dir()/launch_state.toml`).
#[must_use]
pub fn launch_state_file() -> PathBuf {
    config_dir().join("launch_state.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_is_nonempty() {
        assert!(!config_dir().as_os_str().is_empty());
    }

    #[test]
    fn config_file_lives_in_config_dir() {
        let file = config_file();
        assert_eq!(file.parent(), Some(config_dir().as_path()));
        assert!(file.ends_with("config.toml"));
    }

    #[test]
    fn launch_state_file_lives_in_config_dir() {
        let file = launch_state_file();
        assert_eq!(file.parent(), Some(config_dir().as_path()));
        assert!(file.ends_with("launch_state.toml"));
    }
}
