//! pip bootstrap
//!
//! Embeddable distributions ship without pip. `get-pip.py` is fetched into
//! the runtime root and run with the runtime's own interpreter.

use std::path::Path;

use crate::config::defaults;
use crate::core::mirror;
use crate::core::runtime::RuntimeHandle;
use crate::core::stage::{ScriptStage, StageExecutor, StageId, StageOutcome};
use crate::error::BuildError;
use crate::infra::download::DownloadManager;
use crate::infra::process::{ProcessCommand, ProcessRunner};

/// Installs pip into a runtime
pub struct PipBootstrapper<'a> {
    executor: StageExecutor<'a>,
    installer_url: &'a str,
}

impl<'a> PipBootstrapper<'a> {
    pub fn new(
        downloader: &'a DownloadManager,
        runner: &'a dyn ProcessRunner,
        installer_url: &'a str,
    ) -> Self {
        Self {
            executor: StageExecutor::new(downloader, runner),
            installer_url,
        }
    }

    /// Install pip into `runtime`, downloading the installer into `work_dir`
    pub async fn bootstrap(
        &self,
        runtime: &RuntimeHandle,
        work_dir: &Path,
        mirror: Option<&str>,
    ) -> Result<StageOutcome, BuildError> {
        let stage = descriptor(self.installer_url, runtime, work_dir, mirror);
        self.executor
            .execute(&stage)
            .await
            .map_err(|source| BuildError::Bootstrap { source })
    }
}

/// Stage descriptor for bootstrapping pip into `runtime`
pub fn descriptor(
    installer_url: &str,
    runtime: &RuntimeHandle,
    work_dir: &Path,
    mirror: Option<&str>,
) -> ScriptStage {
    let script_path = work_dir.join(defaults::PIP_INSTALLER_NAME);
    let mut command = ProcessCommand::new(runtime.interpreter()).arg(&script_path);
    if mirror.is_some() {
        command = command
            .arg("--no-cache-dir")
            .args(mirror::index_args(mirror));
    }

    ScriptStage {
        stage: StageId::BootstrapPip,
        url: installer_url.to_string(),
        script_path,
        command: command.current_dir(work_dir),
        artifact: None,
    }
}
