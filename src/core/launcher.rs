//! Launcher compilation
//!
//! The launcher is a tiny native program placed in the project directory.
//! It starts the embedded interpreter on the entry script using paths
//! relative to its own location, so the whole project directory can be
//! moved or zipped as one unit.

use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::config::BuildConfiguration;
use crate::core::runtime::RuntimeHandle;
use crate::error::BuildError;
use crate::infra::filesystem;
use crate::infra::process::{ProcessCommand, ProcessRunner};

const CONSOLE_TEMPLATE: &str = include_str!("../../templates/launcher.c");
const WINDOWLESS_TEMPLATE: &str = include_str!("../../templates/launcher-no-window.c");

const COMMAND_PLACEHOLDER: &str = "{{COMMAND_STRING}}";
const SHELL_COMMAND_PLACEHOLDER: &str = "{{SHELL_COMMAND_STRING}}";
const APP_FOLDER_PLACEHOLDER: &str = "{{APP_FOLDER_NAME}}";

/// Produces the final executable
pub trait LauncherCompiler: Send + Sync {
    /// Build the launcher for `config` around `runtime`, returning its path
    fn compile(
        &self,
        config: &BuildConfiguration,
        runtime: &RuntimeHandle,
    ) -> Result<PathBuf, BuildError>;
}

/// Command line the launcher runs
///
/// The console launcher runs from the project directory; the windowless
/// one changes into the application folder first.
pub fn launch_command(config: &BuildConfiguration, runtime: &RuntimeHandle) -> String {
    let runtime_dir = runtime
        .root()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if config.no_window() {
        format!(
            "\"..\\{runtime_dir}\\{}\" \"{}\"",
            defaults::RUNTIME_WINDOWLESS_INTERPRETER,
            config.main_script()
        )
    } else {
        format!(
            "\"{runtime_dir}\\{}\" \"{}\\{}\"",
            defaults::RUNTIME_INTERPRETER,
            config.app_folder(),
            config.main_script()
        )
    }
}

/// [`launch_command`] as handed to `cmd.exe /c` by `_popen` and `system`
///
/// cmd removes the first and last quote of a command holding more than
/// two, so the whole line gets one extra pair.
pub fn shell_command(config: &BuildConfiguration, runtime: &RuntimeHandle) -> String {
    format!("\"{}\"", launch_command(config, runtime))
}

/// Escape `value` for use inside a C string literal
pub fn c_string_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// C source of the launcher for `config`
pub fn render_launcher_source(config: &BuildConfiguration, runtime: &RuntimeHandle) -> String {
    let template = if config.no_window() {
        WINDOWLESS_TEMPLATE
    } else {
        CONSOLE_TEMPLATE
    };

    template
        .replace(
            SHELL_COMMAND_PLACEHOLDER,
            &c_string_escape(&shell_command(config, runtime)),
        )
        .replace(
            COMMAND_PLACEHOLDER,
            &c_string_escape(&launch_command(config, runtime)),
        )
        .replace(APP_FOLDER_PLACEHOLDER, &c_string_escape(config.app_folder()))
}

/// Resource script embedding `icon` as the application icon
pub fn render_resource_script(icon: &Path) -> String {
    format!("1 ICON \"{}\"\n", c_string_escape(&icon.display().to_string()))
}

/// `project_dir/<project dir name>.exe`
pub fn artifact_path(project_dir: &Path) -> PathBuf {
    let name = project_dir
        .file_name()
        .map_or_else(|| "launcher".to_string(), |n| n.to_string_lossy().into_owned());
    project_dir.join(format!("{name}.exe"))
}

/// [`LauncherCompiler`] driving the MSVC command-line tools
///
/// Expects `cl` and `rc` to be runnable, which in practice means running
/// from a Visual Studio developer prompt.
pub struct MsvcLauncherCompiler<'a> {
    runner: &'a dyn ProcessRunner,
    cl: PathBuf,
    rc: PathBuf,
}

impl<'a> MsvcLauncherCompiler<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, cl: PathBuf, rc: PathBuf) -> Self {
        Self { runner, cl, rc }
    }

    fn compile_resources(&self, build_dir: &Path, icon: &Path) -> Result<PathBuf, BuildError> {
        let script = build_dir.join("launcher.rc");
        let compiled = build_dir.join("launcher.res");
        filesystem::write_file(&script, &render_resource_script(icon))?;

        let command = ProcessCommand::new(&self.rc)
            .args(["/nologo", "/fo"])
            .arg(&compiled)
            .arg(&script)
            .current_dir(build_dir);
        self.runner
            .run(&command)
            .map_err(|source| BuildError::Compilation {
                message: "resource compiler failed".to_string(),
                source: Some(source),
            })?;

        Ok(compiled)
    }
}

impl LauncherCompiler for MsvcLauncherCompiler<'_> {
    fn compile(
        &self,
        config: &BuildConfiguration,
        runtime: &RuntimeHandle,
    ) -> Result<PathBuf, BuildError> {
        let build_dir = config.project_dir().join(defaults::LAUNCHER_BUILD_DIR);
        let source = build_dir.join("launcher.c");
        let artifact = artifact_path(config.project_dir());

        filesystem::write_file(&source, &render_launcher_source(config, runtime))?;

        let resources = match config.icon() {
            Some(icon) => Some(self.compile_resources(&build_dir, icon)?),
            None => None,
        };

        let mut command = ProcessCommand::new(&self.cl)
            .args(["/nologo", "/O2"])
            .arg(&source);
        if let Some(res) = &resources {
            command = command.arg(res);
        }
        command = command
            .arg(format!("/Fe:{}", artifact.display()))
            .arg("/link");
        if config.no_window() {
            command = command.arg("/SUBSYSTEM:WINDOWS");
        }
        command = command.arg("user32.lib").current_dir(&build_dir);

        tracing::info!("Compiling launcher {}", artifact.display());
        self.runner
            .run(&command)
            .map_err(|source| BuildError::Compilation {
                message: "cl failed to build the launcher".to_string(),
                source: Some(source),
            })?;

        if !artifact.is_file() {
            return Err(BuildError::Compilation {
                message: format!(
                    "compiler reported success but '{}' is missing",
                    artifact.display()
                ),
                source: None,
            });
        }
        Ok(artifact)
    }
}
