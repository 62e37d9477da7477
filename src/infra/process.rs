//! External process execution
//!
//! Every stage runs its tools through [`ProcessRunner`] so it can be driven
//! by a scripted fake in tests. Calls block until the child exits; there is
//! no timeout.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ProcessError;

/// A command line to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    program: OsString,
    args: Vec<OsString>,
    working_dir: Option<PathBuf>,
}

impl ProcessCommand {
    /// Create a command for `program` with no arguments
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Program to run
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments, in order
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments converted lossily to strings
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Working directory, if one was set
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Program name without its directory, lowercased
    ///
    /// `C:\Windows\powershell.exe` and `powershell` both yield `powershell`.
    pub fn program_name(&self) -> String {
        Path::new(&self.program)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

impl fmt::Display for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_token(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", display_token(arg))?;
        }
        Ok(())
    }
}

fn display_token(token: &OsStr) -> String {
    let text = token.to_string_lossy();
    if text.chars().any(char::is_whitespace) {
        format!("\"{text}\"")
    } else {
        text.into_owned()
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit status (`-1` when terminated by a signal)
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

/// Executes external commands
pub trait ProcessRunner: Send + Sync {
    /// Run `command` to completion, capturing its output
    ///
    /// Returns [`ProcessError::Failed`] when the exit status is not zero.
    fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput, ProcessError>;
}

/// [`ProcessRunner`] backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        tracing::info!("Running command: {command}");

        let mut cmd = Command::new(command.program());
        cmd.args(command.arguments());
        if let Some(dir) = command.working_dir() {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| ProcessError::Spawn {
            program: command.program().to_string_lossy().into_owned(),
            error: e.to_string(),
        })?;

        let result = ProcessOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if output.status.success() {
            tracing::debug!("{} exited cleanly", command.program_name());
            Ok(result)
        } else {
            Err(ProcessError::Failed {
                command: command.to_string(),
                code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            })
        }
    }
}
