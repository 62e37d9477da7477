//! Build pipeline
//!
//! Sequences the stages over one [`BuildConfiguration`]:
//!
//! ```text
//! Idle -> AcquiringRuntime -> BootstrappingPackageManager
//!      -> InstallingDependencies -> [ProtectingSource] -> Compiling -> Completed
//! ```
//!
//! Any stage failure moves to `Failed` and stops the run. Declining the
//! confirmation of an interactive session moves from `Idle` to `Aborted`
//! before anything touches the disk. Nothing is rolled back: a provisioned
//! runtime and its installed packages stay in the project and are reused by
//! the next run.

use std::fmt;
use std::path::PathBuf;

use crate::core::bootstrap::PipBootstrapper;
use crate::core::config::BuildConfiguration;
use crate::core::dependencies::DependencyInstaller;
use crate::core::launcher::LauncherCompiler;
use crate::core::protect::SourceProtector;
use crate::core::runtime::RuntimeAcquirer;
use crate::core::settings::Settings;
use crate::core::stage::StageOutcome;
use crate::core::wizard::Prompter;
use crate::error::{BuildError, PysuitcaseError};
use crate::infra::download::DownloadManager;
use crate::infra::process::ProcessRunner;

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    AcquiringRuntime,
    BootstrappingPackageManager,
    InstallingDependencies,
    ProtectingSource,
    Compiling,
    Completed,
    Failed,
    Aborted,
}

impl PipelineState {
    /// Whether no further transition can happen
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Aborted)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Idle => "Idle",
            Self::AcquiringRuntime => "Provisioning embedded Python",
            Self::BootstrappingPackageManager => "Bootstrapping pip",
            Self::InstallingDependencies => "Installing dependencies",
            Self::ProtectingSource => "Encrypting source code",
            Self::Compiling => "Compiling launcher",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Aborted => "Aborted",
        };
        f.write_str(text)
    }
}

/// Something the pipeline reports while running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Entered a state
    Transition(PipelineState),
    /// Non-fatal problem
    Warning(String),
    /// A stage finished successfully
    StageFinished(StageOutcome),
}

/// Observer of [`PipelineEvent`]s
pub type EventCallback = Box<dyn Fn(&PipelineEvent) + Send + Sync>;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    /// The launcher was built
    Completed { artifact: PathBuf },
    /// The user declined the configuration
    Aborted,
}

/// Where helper scripts are downloaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptUrls {
    /// Runtime provisioning script
    pub runtime_script: String,
    /// pip installer
    pub pip_installer: String,
}

impl ScriptUrls {
    /// URLs in effect for `settings`
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            runtime_script: settings.runtime_script_url().to_string(),
            pip_installer: settings.pip_installer_url().to_string(),
        }
    }
}

impl Default for ScriptUrls {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Runs the build stages in order
pub struct PipelineRunner<'a> {
    downloader: &'a DownloadManager,
    runner: &'a dyn ProcessRunner,
    urls: ScriptUrls,
    protector: &'a dyn SourceProtector,
    compiler: &'a dyn LauncherCompiler,
    state: PipelineState,
    history: Vec<PipelineState>,
    warnings: Vec<String>,
    on_event: Option<EventCallback>,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(
        downloader: &'a DownloadManager,
        runner: &'a dyn ProcessRunner,
        urls: ScriptUrls,
        protector: &'a dyn SourceProtector,
        compiler: &'a dyn LauncherCompiler,
    ) -> Self {
        Self {
            downloader,
            runner,
            urls,
            protector,
            compiler,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
            warnings: Vec::new(),
            on_event: None,
        }
    }

    /// Report events to `callback`
    #[must_use]
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Warnings raised so far
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Show the configuration, confirm it if interactive, then build
    pub async fn run(
        &mut self,
        config: &BuildConfiguration,
        prompter: &mut dyn Prompter,
    ) -> Result<PipelineResult, PysuitcaseError> {
        prompter.notice(&config.to_string());

        if config.interactive() {
            let proceed = prompter.confirm("Proceed with this configuration?", true)?;
            if proceed != Some(true) {
                tracing::info!("Configuration declined");
                self.transition(PipelineState::Aborted);
                return Ok(PipelineResult::Aborted);
            }
        }

        match self.execute(config).await {
            Ok(artifact) => Ok(PipelineResult::Completed { artifact }),
            Err(e) => {
                tracing::error!("Build failed while {}: {e}", self.state);
                self.transition(PipelineState::Failed);
                Err(e.into())
            }
        }
    }

    async fn execute(&mut self, config: &BuildConfiguration) -> Result<PathBuf, BuildError> {
        self.transition(PipelineState::AcquiringRuntime);
        let (runtime, outcome) =
            RuntimeAcquirer::new(self.downloader, self.runner, &self.urls.runtime_script)
                .acquire(config.python_version(), config.arch(), config.project_dir())
                .await?;
        runtime.verify()?;
        self.emit(&PipelineEvent::StageFinished(outcome));

        self.transition(PipelineState::BootstrappingPackageManager);
        let outcome = PipBootstrapper::new(self.downloader, self.runner, &self.urls.pip_installer)
            .bootstrap(&runtime, runtime.root(), config.mirror())
            .await?;
        self.emit(&PipelineEvent::StageFinished(outcome));

        self.transition(PipelineState::InstallingDependencies);
        let report = DependencyInstaller::new(self.runner).install_with_report(
            &runtime,
            &config.requirements_path(),
            config.mirror(),
        );
        for warning in &report.warnings {
            self.warn(warning.clone());
        }
        if let Some(failed) = report.failed_phase() {
            return Err(BuildError::DependencyInstall {
                phase: failed.stage.label().to_string(),
                stdout: failed.stdout.clone(),
                stderr: failed.stderr.clone(),
            });
        }
        self.emit(&PipelineEvent::StageFinished(report.essentials));
        if let Some(outcome) = report.requirements {
            self.emit(&PipelineEvent::StageFinished(outcome));
        }

        if config.protect_source() {
            self.transition(PipelineState::ProtectingSource);
            let outcome = self
                .protector
                .protect(&config.app_dir(), config.delete_originals())?;
            self.emit(&PipelineEvent::StageFinished(outcome));
        }

        self.transition(PipelineState::Compiling);
        let artifact = self.compiler.compile(config, &runtime)?;

        self.transition(PipelineState::Completed);
        Ok(artifact)
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!("Pipeline: {} -> {next}", self.state);
        self.state = next;
        self.history.push(next);
        self.emit(&PipelineEvent::Transition(next));
    }

    fn warn(&mut self, warning: String) {
        self.emit(&PipelineEvent::Warning(warning.clone()));
        self.warnings.push(warning);
    }

    fn emit(&self, event: &PipelineEvent) {
        if let Some(callback) = &self.on_event {
            callback(event);
        }
    }
}
