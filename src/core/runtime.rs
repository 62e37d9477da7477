//! Embedded runtime acquisition
//!
//! Provisions an embeddable Python distribution into the project with the
//! `PythonEmbed4Win.ps1` helper. The target directory is derived from the
//! version and architecture alone, so a second build of the same target
//! finds the runtime already in place.

use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::config::Arch;
use crate::core::stage::{ScriptStage, StageExecutor, StageId, StageOutcome};
use crate::error::BuildError;
use crate::infra::download::DownloadManager;
use crate::infra::process::{ProcessCommand, ProcessRunner};

/// Directory name of a runtime: `runtime-{version}-embed-{arch}`
pub fn runtime_dir_name(version: &str, arch: Arch) -> String {
    format!("runtime-{version}-embed-{arch}")
}

/// Location of a provisioned runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeHandle {
    root: PathBuf,
    interpreter: PathBuf,
}

impl RuntimeHandle {
    /// Handle for the runtime of `version`/`arch` under `project_dir`
    pub fn for_target(project_dir: &Path, version: &str, arch: Arch) -> Self {
        let root = project_dir.join(runtime_dir_name(version, arch));
        let interpreter = root.join(defaults::RUNTIME_INTERPRETER);
        Self { root, interpreter }
    }

    /// Runtime root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `python.exe` inside the runtime
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// `pythonw.exe` inside the runtime
    pub fn windowless_interpreter(&self) -> PathBuf {
        self.root.join(defaults::RUNTIME_WINDOWLESS_INTERPRETER)
    }

    /// Fail with [`BuildError::RuntimeMissing`] unless the interpreter exists
    pub fn verify(&self) -> Result<(), BuildError> {
        if self.interpreter.is_file() {
            Ok(())
        } else {
            Err(BuildError::RuntimeMissing {
                path: self.interpreter.clone(),
            })
        }
    }
}

/// Provisions embedded runtimes
pub struct RuntimeAcquirer<'a> {
    executor: StageExecutor<'a>,
    script_url: &'a str,
}

impl<'a> RuntimeAcquirer<'a> {
    pub fn new(
        downloader: &'a DownloadManager,
        runner: &'a dyn ProcessRunner,
        script_url: &'a str,
    ) -> Self {
        Self {
            executor: StageExecutor::new(downloader, runner),
            script_url,
        }
    }

    /// Provision `version`/`arch` into `project_dir`
    ///
    /// A runtime whose interpreter is already in place is reused without
    /// downloading or running anything. The caller checks the returned
    /// handle with [`RuntimeHandle::verify`].
    pub async fn acquire(
        &self,
        version: &str,
        arch: Arch,
        project_dir: &Path,
    ) -> Result<(RuntimeHandle, StageOutcome), BuildError> {
        let handle = RuntimeHandle::for_target(project_dir, version, arch);
        if handle.verify().is_ok() {
            tracing::info!("Reusing runtime at {}", handle.root().display());
            let outcome = StageOutcome {
                stage: StageId::AcquireRuntime,
                success: true,
                stdout: String::new(),
                stderr: String::new(),
                artifact: Some(handle.interpreter().to_path_buf()),
            };
            return Ok((handle, outcome));
        }

        let stage = descriptor(self.script_url, &handle, version, arch, project_dir);

        tracing::info!(
            "Provisioning Python {version} ({arch}) into {}",
            handle.root().display()
        );
        let outcome = self
            .executor
            .execute(&stage)
            .await
            .map_err(|source| BuildError::RuntimeAcquisition { source })?;

        Ok((handle, outcome))
    }
}

/// Stage descriptor for provisioning `handle`
pub fn descriptor(
    script_url: &str,
    handle: &RuntimeHandle,
    version: &str,
    arch: Arch,
    project_dir: &Path,
) -> ScriptStage {
    let script_path = project_dir.join(defaults::RUNTIME_SCRIPT_NAME);
    let command = ProcessCommand::new("powershell")
        .args(["-ExecutionPolicy", "Bypass", "-File"])
        .arg(&script_path)
        .args(["-Version", version, "-Arch", arch.as_str(), "-Path"])
        .arg(handle.root())
        .arg("-SkipExec")
        .current_dir(project_dir);

    ScriptStage {
        stage: StageId::AcquireRuntime,
        url: script_url.to_string(),
        script_path,
        command,
        artifact: Some(handle.interpreter().to_path_buf()),
    }
}
