//! Reproducible commands
//!
//! Renders a resolved configuration as a direct-mode command line so an
//! interactive session can be repeated without the wizard.

use std::path::Path;

use crate::config::defaults;
use crate::core::config::BuildConfiguration;

/// Direct-mode command equivalent to `config`
///
/// Options appear in a fixed order as `--name=value`, so values starting
/// with `-` survive parsing; false flags are left out. The target
/// version and architecture are left out when sources are protected since
/// they are locked to the host and may not be passed with `--encrypt`.
pub fn to_command(config: &BuildConfiguration) -> String {
    let mut parts = vec![
        defaults::COMMAND_NAME.to_string(),
        quote_path(config.project_dir()),
    ];

    let mut option = |name: &str, value: String| parts.push(format!("--{name}={value}"));

    option("app-folder", quote(config.app_folder()));
    option("main-script", quote(config.main_script()));
    option("requirements-file", quote(config.requirements_file()));
    if !config.protect_source() {
        option("python-version", quote(config.python_version()));
        option("arch", config.arch().to_string());
    }
    if let Some(icon) = config.icon() {
        option("icon", quote_path(icon));
    }
    if let Some(mirror) = config.mirror() {
        option("mirror", quote(mirror));
    }

    for (enabled, flag) in [
        (config.protect_source(), "--encrypt"),
        (config.delete_originals(), "--delete-source-on-encrypt"),
        (config.no_window(), "--no-window"),
    ] {
        if enabled {
            parts.push(flag.to_string());
        }
    }

    parts.join(" ")
}

/// Double-quote `value` if it contains whitespace
pub fn quote(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

fn quote_path(path: &Path) -> String {
    quote(&path.display().to_string())
}
