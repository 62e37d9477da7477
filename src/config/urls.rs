//! Helper script URLs

/// Embedded Python provisioning script
pub const RUNTIME_SCRIPT: &str =
    "https://raw.githubusercontent.com/jtmoon79/PythonEmbed4Win/main/PythonEmbed4Win.ps1";

/// pip bootstrap installer
pub const PIP_INSTALLER: &str = "https://bootstrap.pypa.io/get-pip.py";
