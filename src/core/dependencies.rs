//! Dependency installation
//!
//! Two phases: the build essentials every project needs to build wheels,
//! then the project's own requirements file. A failed first phase stops
//! the second from running.

use std::path::Path;

use crate::config::defaults;
use crate::core::mirror;
use crate::core::runtime::RuntimeHandle;
use crate::core::stage::{StageId, StageOutcome};
use crate::error::ProcessError;
use crate::infra::process::{ProcessCommand, ProcessRunner};

/// What dependency installation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Build essentials phase
    pub essentials: StageOutcome,
    /// Requirements phase; `None` when it did not run
    pub requirements: Option<StageOutcome>,
    /// Non-fatal problems
    pub warnings: Vec<String>,
}

impl InstallReport {
    /// Whether every phase that ran succeeded
    pub fn success(&self) -> bool {
        self.essentials.success && self.requirements.as_ref().map_or(true, |r| r.success)
    }

    /// First failed phase
    pub fn failed_phase(&self) -> Option<&StageOutcome> {
        std::iter::once(&self.essentials)
            .chain(self.requirements.as_ref())
            .find(|outcome| !outcome.success)
    }
}

/// Installs packages into a runtime with its own pip
pub struct DependencyInstaller<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> DependencyInstaller<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Install the build essentials, then `requirements` if it exists
    ///
    /// A missing requirements file is a warning and counts as success.
    pub fn install(
        &self,
        runtime: &RuntimeHandle,
        requirements: &Path,
        mirror: Option<&str>,
    ) -> bool {
        self.install_with_report(runtime, requirements, mirror)
            .success()
    }

    /// Same as [`Self::install`], reporting each phase
    pub fn install_with_report(
        &self,
        runtime: &RuntimeHandle,
        requirements: &Path,
        mirror: Option<&str>,
    ) -> InstallReport {
        let essentials = self.run_phase(
            StageId::InstallBuildEssentials,
            &essentials_command(runtime, mirror),
        );
        let mut report = InstallReport {
            essentials,
            requirements: None,
            warnings: Vec::new(),
        };

        if !report.essentials.success {
            return report;
        }

        if !requirements.is_file() {
            let warning = format!(
                "Requirements file not found at '{}'. Skipping project dependency installation.",
                requirements.display()
            );
            tracing::warn!("{warning}");
            report.warnings.push(warning);
            return report;
        }

        report.requirements = Some(self.run_phase(
            StageId::InstallRequirements,
            &requirements_command(runtime, requirements, mirror),
        ));
        report
    }

    fn run_phase(&self, stage: StageId, command: &ProcessCommand) -> StageOutcome {
        tracing::info!("{stage}...");
        match self.runner.run(command) {
            Ok(output) => StageOutcome::from_output(stage, output, None),
            Err(e) => {
                tracing::warn!("{stage} failed: {e}");
                let (stdout, stderr) = match e {
                    ProcessError::Failed { stdout, stderr, .. } => (stdout, stderr),
                    spawn @ ProcessError::Spawn { .. } => (String::new(), spawn.to_string()),
                };
                StageOutcome {
                    stage,
                    success: false,
                    stdout,
                    stderr,
                    artifact: None,
                }
            }
        }
    }
}

/// `python -m pip install setuptools wheel [index args]`
pub fn essentials_command(runtime: &RuntimeHandle, mirror: Option<&str>) -> ProcessCommand {
    ProcessCommand::new(runtime.interpreter())
        .args(["-m", "pip", "install"])
        .args(defaults::BUILD_ESSENTIALS)
        .args(mirror::index_args(mirror))
}

/// `python -m pip install --no-cache-dir --upgrade -r <file> [index args]`
pub fn requirements_command(
    runtime: &RuntimeHandle,
    requirements: &Path,
    mirror: Option<&str>,
) -> ProcessCommand {
    ProcessCommand::new(runtime.interpreter())
        .args(["-m", "pip", "install", "--no-cache-dir", "--upgrade", "-r"])
        .arg(requirements)
        .args(mirror::index_args(mirror))
}
