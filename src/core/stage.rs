//! Download-then-run stages
//!
//! Runtime provisioning and the pip bootstrap both fetch a helper script,
//! run it once and delete it. [`ScriptStage`] describes such a stage and
//! [`StageExecutor`] runs it.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{DownloadError, StageError};
use crate::infra::download::{DownloadManager, ProgressCallback};
use crate::infra::filesystem::{self, ScopedFile};
use crate::infra::process::{ProcessCommand, ProcessOutput, ProcessRunner};

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Provision the embedded runtime
    AcquireRuntime,
    /// Install pip into the runtime
    BootstrapPip,
    /// Install setuptools and wheel
    InstallBuildEssentials,
    /// Install the project's requirements
    InstallRequirements,
    /// Compile the sources
    ProtectSource,
    /// Build the launcher executable
    CompileLauncher,
}

impl StageId {
    /// Human-readable stage name
    pub fn label(self) -> &'static str {
        match self {
            Self::AcquireRuntime => "Provisioning embedded Python",
            Self::BootstrapPip => "Installing pip",
            Self::InstallBuildEssentials => "Installing build essentials",
            Self::InstallRequirements => "Installing project dependencies",
            Self::ProtectSource => "Encrypting source code",
            Self::CompileLauncher => "Compiling launcher",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one stage invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    /// Stage that ran
    pub stage: StageId,
    /// Whether the stage succeeded
    pub success: bool,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Artifact the stage produced
    pub artifact: Option<PathBuf>,
}

impl StageOutcome {
    /// Successful outcome built from a finished process
    pub fn from_output(stage: StageId, output: ProcessOutput, artifact: Option<PathBuf>) -> Self {
        Self {
            stage,
            success: true,
            stdout: output.stdout,
            stderr: output.stderr,
            artifact,
        }
    }
}

/// A "download a script, run it, remove it" stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStage {
    /// Stage identifier
    pub stage: StageId,
    /// Where the script is fetched from
    pub url: String,
    /// Where the script is stored while the stage runs
    pub script_path: PathBuf,
    /// Command running the script
    pub command: ProcessCommand,
    /// Artifact expected on success
    pub artifact: Option<PathBuf>,
}

/// Runs [`ScriptStage`]s
pub struct StageExecutor<'a> {
    downloader: &'a DownloadManager,
    runner: &'a dyn ProcessRunner,
}

impl<'a> StageExecutor<'a> {
    pub fn new(downloader: &'a DownloadManager, runner: &'a dyn ProcessRunner) -> Self {
        Self { downloader, runner }
    }

    /// Download the script, run the command, remove the script
    ///
    /// The script is removed whether the download, the command or neither
    /// failed.
    pub async fn execute(&self, stage: &ScriptStage) -> Result<StageOutcome, StageError> {
        let script = ScopedFile::new(&stage.script_path);

        tracing::info!(
            "Downloading {} from {}",
            file_name(script.path()),
            stage.url
        );
        let stage_id = stage.stage;
        let progress: ProgressCallback = Box::new(move |downloaded, total| {
            tracing::trace!("{stage_id}: {downloaded}/{total} bytes");
        });
        self.downloader
            .download(&stage.url, script.path(), Some(progress))
            .await?;
        if script.path().extension().is_some_and(|ext| ext.eq_ignore_ascii_case("ps1")) {
            filesystem::ensure_utf8_bom(script.path()).map_err(|e| DownloadError::IoError {
                path: script.path().to_path_buf(),
                error: e.to_string(),
            })?;
        }

        tracing::info!("Running {}...", file_name(script.path()));
        let output = self.runner.run(&stage.command)?;

        Ok(StageOutcome::from_output(
            stage.stage,
            output,
            stage.artifact.clone(),
        ))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessError;
    use crate::test_utils::{program_is, FakeProcessRunner};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve_script(server: &MockServer, name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_string("# helper"))
            .mount(server)
            .await;
    }

    fn stage_for(server: &MockServer, dir: &Path, name: &str) -> ScriptStage {
        let script_path = dir.join(name);
        ScriptStage {
            stage: StageId::BootstrapPip,
            url: format!("{}/{name}", server.uri()),
            command: ProcessCommand::new("python").arg(&script_path),
            script_path,
            artifact: None,
        }
    }

    #[tokio::test]
    async fn test_script_removed_after_success() {
        let server = MockServer::start().await;
        serve_script(&server, "get-pip.py").await;
        let temp = TempDir::new().unwrap();
        let stage = stage_for(&server, temp.path(), "get-pip.py");

        let seen = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen_in_runner = seen.clone();
        let script_path = stage.script_path.clone();
        let runner = FakeProcessRunner::new().on(program_is("python"), move |_| {
            seen_in_runner.store(script_path.exists(), std::sync::atomic::Ordering::SeqCst);
            Ok(FakeProcessRunner::stdout("Successfully installed pip"))
        });
        let downloader = DownloadManager::new();

        let outcome = StageExecutor::new(&downloader, &runner)
            .execute(&stage)
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.stdout, "Successfully installed pip");
        assert!(seen.load(std::sync::atomic::Ordering::SeqCst), "script present while running");
        assert!(!stage.script_path.exists());
    }

    #[tokio::test]
    async fn test_script_removed_after_process_failure() {
        let server = MockServer::start().await;
        serve_script(&server, "get-pip.py").await;
        let temp = TempDir::new().unwrap();
        let stage = stage_for(&server, temp.path(), "get-pip.py");
        let runner = FakeProcessRunner::new()
            .on(program_is("python"), |cmd| Err(FakeProcessRunner::failure(cmd, 1, "boom")));
        let downloader = DownloadManager::new();

        let err = StageExecutor::new(&downloader, &runner)
            .execute(&stage)
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::Process(ProcessError::Failed { code: 1, .. })));
        assert!(!stage.script_path.exists());
    }

    #[tokio::test]
    async fn test_download_failure_runs_nothing() {
        let server = MockServer::start().await;
        let temp = TempDir::new().unwrap();
        let stage = stage_for(&server, temp.path(), "missing.py");
        let runner = FakeProcessRunner::new();
        let downloader = DownloadManager::new();

        let err = StageExecutor::new(&downloader, &runner)
            .execute(&stage)
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::Download(DownloadError::NetworkError { .. })));
        assert!(runner.calls().is_empty());
        assert!(!stage.script_path.exists());
    }

    #[tokio::test]
    async fn test_powershell_script_gets_byte_order_mark() {
        let server = MockServer::start().await;
        serve_script(&server, "PythonEmbed4Win.ps1").await;
        let temp = TempDir::new().unwrap();
        let mut stage = stage_for(&server, temp.path(), "PythonEmbed4Win.ps1");
        stage.command = ProcessCommand::new("powershell").arg(&stage.script_path);

        let head = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let head_in_runner = head.clone();
        let script_path = stage.script_path.clone();
        let runner = FakeProcessRunner::new().on(program_is("powershell"), move |_| {
            *head_in_runner.lock().unwrap() = std::fs::read(&script_path).unwrap();
            Ok(FakeProcessRunner::stdout(""))
        });
        let downloader = DownloadManager::new();

        StageExecutor::new(&downloader, &runner)
            .execute(&stage)
            .await
            .unwrap();

        let bytes = head.lock().unwrap().clone();
        assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
        assert_eq!(&bytes[3..], b"# helper");
        assert!(!stage.script_path.exists());
    }

    #[tokio::test]
    async fn test_python_script_left_as_downloaded() {
        let server = MockServer::start().await;
        serve_script(&server, "get-pip.py").await;
        let temp = TempDir::new().unwrap();
        let stage = stage_for(&server, temp.path(), "get-pip.py");

        let head = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let head_in_runner = head.clone();
        let script_path = stage.script_path.clone();
        let runner = FakeProcessRunner::new().on(program_is("python"), move |_| {
            *head_in_runner.lock().unwrap() = std::fs::read(&script_path).unwrap();
            Ok(FakeProcessRunner::stdout(""))
        });
        let downloader = DownloadManager::new();

        StageExecutor::new(&downloader, &runner)
            .execute(&stage)
            .await
            .unwrap();

        assert_eq!(head.lock().unwrap().as_slice(), b"# helper");
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(StageId::AcquireRuntime.to_string(), "Provisioning embedded Python");
        assert_eq!(StageId::CompileLauncher.label(), "Compiling launcher");
    }
}
