//! Error types for pysuitcase
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
///
/// Raised by the resolver before any build stage has run, so none of
/// these need cleanup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Target version or architecture supplied together with --encrypt
    #[error("When using --encrypt, you cannot specify --python-version or --arch. Encryption requires the host's Python environment")]
    ProtectionLocked,

    /// Deleting originals requested without protection
    #[error("--delete-source-on-encrypt requires --encrypt")]
    DeleteRequiresProtect,

    /// Project directory missing
    #[error("Project directory not found: {path}")]
    ProjectDirNotFound { path: PathBuf },

    /// Icon file missing
    #[error("Icon file not found at '{path}'. Please provide a valid path")]
    IconNotFound { path: PathBuf },

    /// Mirror is not a usable URL
    #[error("Invalid mirror URL '{url}': {reason}")]
    InvalidMirror { url: String, reason: String },

    /// Target version malformed
    #[error("Invalid Python version '{version}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion { version: String },

    /// Host interpreter required but not detected
    #[error("No host Python interpreter detected; {reason}")]
    HostRuntimeUnavailable { reason: String },

    /// Empty value for a required name
    #[error("Option '{name}' cannot be empty")]
    EmptyField { name: String },

    /// Prompt I/O failed
    #[error("Failed to read answer: {error}")]
    Prompt { error: String },
}

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    NetworkError { url: String, error: String },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// External process errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Process could not be started
    #[error("Failed to start '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Process exited with a non-zero status
    #[error("Command '{command}' exited with status {code}")]
    Failed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },
}

impl ProcessError {
    /// Captured standard error, if the process ran at all
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            Self::Spawn { .. } => None,
        }
    }

    /// Captured standard output, if the process ran at all
    pub fn stdout(&self) -> Option<&str> {
        match self {
            Self::Failed { stdout, .. } => Some(stdout),
            Self::Spawn { .. } => None,
        }
    }
}

/// Failure of a download-then-run stage
#[derive(Error, Debug)]
pub enum StageError {
    /// Helper script could not be fetched
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Helper script ran and failed
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Build stage errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Runtime provisioning failed
    #[error("Failed to provision the embedded Python runtime: {source}")]
    RuntimeAcquisition {
        #[source]
        source: StageError,
    },

    /// Runtime reported success but the interpreter is absent
    #[error("Runtime provisioning reported success but '{path}' does not exist")]
    RuntimeMissing { path: PathBuf },

    /// pip bootstrap failed
    #[error("Failed to bootstrap pip: {source}")]
    Bootstrap {
        #[source]
        source: StageError,
    },

    /// Dependency installation failed
    #[error("Failed to install dependencies ({phase})")]
    DependencyInstall {
        phase: String,
        stdout: String,
        stderr: String,
    },

    /// Source protection failed
    #[error("Source protection failed: {message}")]
    Protection {
        message: String,
        #[source]
        source: Option<ProcessError>,
    },

    /// Launcher compilation failed
    #[error("Launcher compilation failed: {message}")]
    Compilation {
        message: String,
        #[source]
        source: Option<ProcessError>,
    },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Top-level pysuitcase error type
#[derive(Error, Debug)]
pub enum PysuitcaseError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Global configuration error
    #[error("Settings error: {0}")]
    Settings(#[from] crate::core::settings::SettingsError),
}

impl PysuitcaseError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}
