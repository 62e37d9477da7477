//! Host interpreter detection
//!
//! The host's Python version and architecture are the defaults for the
//! target runtime, and the only permitted target when protecting sources.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::core::config::Arch;
use crate::infra::process::{ProcessCommand, ProcessRunner};

/// Prints `<version> <bits> <machine>` on one line
const PROBE_SCRIPT: &str = "import platform; print(platform.python_version(), platform.architecture()[0], platform.machine())";

/// What was found on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    python_version: Option<String>,
    arch: Arch,
    python_path: Option<PathBuf>,
}

impl HostInfo {
    /// Build host information from known values
    pub fn new(python_version: Option<String>, arch: Arch, python_path: Option<PathBuf>) -> Self {
        Self {
            python_version,
            arch,
            python_path,
        }
    }

    /// Probe the host interpreter
    ///
    /// Uses `python_override` when given, otherwise the first of `python`
    /// and `python3` on `PATH`. Never fails: a missing or broken interpreter
    /// leaves the version unknown and falls back to the architecture this
    /// binary was built for.
    pub fn detect(runner: &dyn ProcessRunner, python_override: Option<&Path>) -> Self {
        let fallback_arch = arch_of_build_target();

        let Some(python) = python_override
            .map(Path::to_path_buf)
            .or_else(|| which::which("python").ok())
            .or_else(|| which::which("python3").ok())
        else {
            tracing::info!("No host Python interpreter found on PATH");
            return Self::new(None, fallback_arch, None);
        };

        let probe = ProcessCommand::new(&python).args(["-c", PROBE_SCRIPT]);
        match runner.run(&probe) {
            Ok(output) => match parse_probe(&output.stdout) {
                Some((version, arch)) => {
                    tracing::info!("Host Python {version} ({arch}) at {}", python.display());
                    Self::new(Some(version), arch, Some(python))
                }
                None => {
                    tracing::warn!(
                        "Unrecognized host Python probe output: {}",
                        output.stdout.trim()
                    );
                    Self::new(None, fallback_arch, Some(python))
                }
            },
            Err(e) => {
                tracing::warn!("Failed to probe host Python at {}: {e}", python.display());
                Self::new(None, fallback_arch, None)
            }
        }
    }

    /// Host Python version (`MAJOR.MINOR.PATCH`), if detected
    pub fn python_version(&self) -> Option<&str> {
        self.python_version.as_deref()
    }

    /// Host architecture
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Host interpreter path, if detected
    pub fn python_path(&self) -> Option<&Path> {
        self.python_path.as_deref()
    }
}

/// Parse the probe's `3.11.4 64bit AMD64` line
fn parse_probe(output: &str) -> Option<(String, Arch)> {
    let re = Regex::new(r"(\d+\.\d+\.\d+)\S*\s+(32bit|64bit)\s+(\S*)").ok()?;
    let caps = re.captures(output)?;

    let version = caps.get(1)?.as_str().to_string();
    let bits = caps.get(2)?.as_str();
    let machine = caps.get(3).map_or("", |m| m.as_str()).to_ascii_lowercase();

    let arch = if machine == "arm64" || machine == "aarch64" {
        Arch::Arm64
    } else if bits == "64bit" {
        Arch::Amd64
    } else {
        Arch::Win32
    };

    Some((version, arch))
}

fn arch_of_build_target() -> Arch {
    match std::env::consts::ARCH {
        "aarch64" => Arch::Arm64,
        "x86" => Arch::Win32,
        _ if cfg!(target_pointer_width = "32") => Arch::Win32,
        _ => Arch::Amd64,
    }
}
