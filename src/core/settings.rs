//! Global settings
//!
//! Reads user-wide settings from `config.toml` in the config directory:
//! helper script sources, the host interpreter, compiler paths and the
//! wizard's mirror suggestion. Every key is optional.

use crate::infra::dirs::PysuitcaseDirs;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Settings error types
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read the settings file
    #[error("Failed to access settings file '{path}': {error}")]
    IoError { path: String, error: String },

    /// Failed to parse the settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// User-wide settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Helper script sources
    #[serde(default)]
    pub urls: UrlSettings,

    /// Host interpreter
    #[serde(default)]
    pub host: HostSettings,

    /// Native toolchain
    #[serde(default)]
    pub toolchain: ToolchainSettings,

    /// Wizard defaults
    #[serde(default)]
    pub wizard: WizardSettings,
}

/// Helper script sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UrlSettings {
    /// Runtime provisioning script URL
    pub runtime_script: Option<String>,

    /// pip installer URL
    pub pip_installer: Option<String>,
}

/// Host interpreter settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostSettings {
    /// Interpreter used for detection and protection instead of `PATH`
    pub python: Option<String>,
}

/// Native toolchain settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolchainSettings {
    /// C compiler
    pub cl: Option<String>,

    /// Resource compiler
    pub rc: Option<String>,
}

/// Wizard defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WizardSettings {
    /// Mirror suggested when the user opts into one
    pub default_mirror: Option<String>,
}

impl Settings {
    /// Load settings from the config directory
    ///
    /// A missing file yields defaults; an unparsable one is an error.
    pub fn load(dirs: &PysuitcaseDirs) -> Result<Self, SettingsError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load settings from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::IoError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Effective runtime provisioning script URL
    #[must_use]
    pub fn runtime_script_url(&self) -> &str {
        self.urls
            .runtime_script
            .as_deref()
            .unwrap_or(crate::config::urls::RUNTIME_SCRIPT)
    }

    /// Effective pip installer URL
    #[must_use]
    pub fn pip_installer_url(&self) -> &str {
        self.urls
            .pip_installer
            .as_deref()
            .unwrap_or(crate::config::urls::PIP_INSTALLER)
    }

    /// Configured host interpreter, if any
    #[must_use]
    pub fn host_python(&self) -> Option<&Path> {
        self.host.python.as_deref().map(Path::new)
    }

    /// Effective C compiler
    #[must_use]
    pub fn cl(&self) -> &str {
        self.toolchain.cl.as_deref().unwrap_or("cl")
    }

    /// Effective resource compiler
    #[must_use]
    pub fn rc(&self) -> &str {
        self.toolchain.rc.as_deref().unwrap_or("rc")
    }

    /// Effective wizard mirror suggestion
    #[must_use]
    pub fn default_mirror(&self) -> &str {
        self.wizard
            .default_mirror
            .as_deref()
            .unwrap_or(crate::config::defaults::DEFAULT_MIRROR)
    }
}
