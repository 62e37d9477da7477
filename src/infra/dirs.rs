//! Platform-specific directory management
//!
//! Provides the config directory holding `config.toml`.
//!
//! `PYSUITCASE_CONFIG_DIR` overrides the platform default.

use std::env;
use std::path::PathBuf;

/// Environment variable name for the config directory override
pub const ENV_CONFIG_DIR: &str = "PYSUITCASE_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "pysuitcase";

/// Platform-specific directory provider for pysuitcase
#[derive(Debug, Clone)]
pub struct PysuitcaseDirs {
    config_dir: PathBuf,
}

impl PysuitcaseDirs {
    /// Create a new `PysuitcaseDirs` instance
    ///
    /// Checks the environment variable first, then falls back to the
    /// platform default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Create an instance rooted at an explicit config directory
    #[must_use]
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the config directory path
    ///
    /// - Windows: `%APPDATA%\pysuitcase`
    /// - Linux: `$XDG_CONFIG_HOME/pysuitcase` or `~/.config/pysuitcase`
    /// - macOS: `~/Library/Application Support/pysuitcase`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for PysuitcaseDirs {
    fn default() -> Self {
        Self::new()
    }
}
