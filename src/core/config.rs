//! Build configuration model
//!
//! [`RawOptions`] is what the command line or the wizard collected;
//! [`BuildConfiguration`] is the validated, immutable result produced by
//! [`crate::core::resolver`]. Stages only ever read a `BuildConfiguration`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::runtime;

/// Target architecture of the embedded runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit x86
    Amd64,
    /// 32-bit x86
    Win32,
    /// 64-bit ARM
    Arm64,
}

impl Arch {
    /// All architectures, in display order
    pub const ALL: [Arch; 3] = [Arch::Amd64, Arch::Win32, Arch::Arm64];

    /// Accepted spellings, in display order
    pub const NAMES: [&'static str; 3] = ["amd64", "win32", "arm64"];

    /// Name used on the command line and in runtime directory names
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Win32 => "win32",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|arch| arch.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "invalid architecture '{s}': must be one of {}",
                    Self::NAMES.join(", ")
                )
            })
    }
}

/// Unvalidated options from the command line or the wizard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
    /// Project root directory
    pub project_dir: Option<PathBuf>,
    /// Source folder inside the project
    pub app_folder: Option<String>,
    /// Entry script inside the source folder
    pub main_script: Option<String>,
    /// Requirements file inside the source folder
    pub requirements_file: Option<String>,
    /// Explicit target Python version
    pub python_version: Option<String>,
    /// Explicit target architecture
    pub arch: Option<Arch>,
    /// Launcher icon
    pub icon: Option<PathBuf>,
    /// Package index mirror
    pub mirror: Option<String>,
    /// Protect (compile) the sources
    pub encrypt: bool,
    /// Delete plaintext sources after protection
    pub delete_source_on_encrypt: bool,
    /// Build a windowless launcher
    pub no_window: bool,
    /// Options were collected interactively
    pub interactive: bool,
}

/// Validated, immutable build configuration
///
/// Constructed only by [`crate::core::resolver::resolve`], which enforces:
/// paths are absolute, protection implies the host's version and
/// architecture, and deleting originals implies protection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub(crate) project_dir: PathBuf,
    pub(crate) app_folder: String,
    pub(crate) main_script: String,
    pub(crate) requirements_file: String,
    pub(crate) python_version: String,
    pub(crate) arch: Arch,
    pub(crate) icon: Option<PathBuf>,
    pub(crate) mirror: Option<String>,
    pub(crate) protect_source: bool,
    pub(crate) delete_originals: bool,
    pub(crate) no_window: bool,
    pub(crate) interactive: bool,
}

impl BuildConfiguration {
    /// Absolute project root
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Source folder name
    pub fn app_folder(&self) -> &str {
        &self.app_folder
    }

    /// Entry script name
    pub fn main_script(&self) -> &str {
        &self.main_script
    }

    /// Requirements file name
    pub fn requirements_file(&self) -> &str {
        &self.requirements_file
    }

    /// Target Python version
    pub fn python_version(&self) -> &str {
        &self.python_version
    }

    /// Target architecture
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Absolute icon path
    pub fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }

    /// Package index mirror
    pub fn mirror(&self) -> Option<&str> {
        self.mirror.as_deref()
    }

    /// Whether sources are protected before compilation
    pub fn protect_source(&self) -> bool {
        self.protect_source
    }

    /// Whether plaintext sources are deleted after protection
    pub fn delete_originals(&self) -> bool {
        self.delete_originals
    }

    /// Whether the launcher is windowless
    pub fn no_window(&self) -> bool {
        self.no_window
    }

    /// Whether the session is interactive
    pub fn interactive(&self) -> bool {
        self.interactive
    }

    /// `project_dir/app_folder`
    pub fn app_dir(&self) -> PathBuf {
        self.project_dir.join(&self.app_folder)
    }

    /// `project_dir/app_folder/requirements_file`
    pub fn requirements_path(&self) -> PathBuf {
        self.app_dir().join(&self.requirements_file)
    }

    /// Directory the embedded runtime is provisioned into
    pub fn runtime_dir(&self) -> PathBuf {
        self.project_dir
            .join(runtime::runtime_dir_name(&self.python_version, self.arch))
    }

    /// Label/value rows describing this configuration
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let target_note = if self.protect_source {
            "(Locked to Host for Encryption)"
        } else {
            "(Target)"
        };

        let mut rows = vec![
            ("Project Directory", self.project_dir.display().to_string()),
            ("Application Folder", self.app_dir().display().to_string()),
            ("Main Script", self.main_script.clone()),
            (
                "Python Version",
                format!("{} {target_note}", self.python_version),
            ),
            ("Architecture", format!("{} {target_note}", self.arch)),
            (
                "Requirements File",
                self.requirements_path().display().to_string(),
            ),
            (
                "PyPI Mirror",
                self.mirror
                    .clone()
                    .unwrap_or_else(|| "Not specified".to_string()),
            ),
            (
                "Custom Icon",
                self.icon
                    .as_ref()
                    .map_or_else(|| "Default".to_string(), |p| p.display().to_string()),
            ),
            (
                "Launcher Mode",
                if self.no_window { "Windowless" } else { "Console" }.to_string(),
            ),
            (
                "Encrypt Source Code",
                if self.protect_source { "Yes" } else { "No" }.to_string(),
            ),
        ];

        if self.protect_source {
            rows.push((
                "Delete Source Files",
                if self.delete_originals { "YES" } else { "NO" }.to_string(),
            ));
        }

        rows
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final Configuration Summary:")?;
        for (label, value) in self.summary() {
            writeln!(f, "  - {:<22}{value}", format!("{label}:"))?;
        }
        Ok(())
    }
}
