//! Build command implementation
//!
//! Wires the real collaborators into the pipeline and renders its events.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};
use indicatif::ProgressBar;

use crate::cli::output::{
    create_spinner, print_banner, print_detail, print_info, print_success, print_warning,
};
use crate::core::config::BuildConfiguration;
use crate::core::host::HostInfo;
use crate::core::launcher::MsvcLauncherCompiler;
use crate::core::pipeline::{
    PipelineEvent, PipelineResult, PipelineRunner, PipelineState, ScriptUrls,
};
use crate::core::protect::CythonProtector;
use crate::core::reproduce;
use crate::core::settings::Settings;
use crate::core::wizard::Prompter;
use crate::infra::download::DownloadManager;
use crate::infra::process::ProcessRunner;

/// Run the pipeline for `config`
pub async fn execute(
    config: &BuildConfiguration,
    settings: &Settings,
    host: &HostInfo,
    runner: &dyn ProcessRunner,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    let downloader = DownloadManager::new();
    let host_python = host
        .python_path()
        .map_or_else(|| PathBuf::from("python"), Path::to_path_buf);
    let protector = CythonProtector::new(runner, host_python, config.main_script());
    let compiler = MsvcLauncherCompiler::new(runner, settings.cl().into(), settings.rc().into());

    let spinner: Mutex<Option<ProgressBar>> = Mutex::new(None);
    let mut pipeline = PipelineRunner::new(
        &downloader,
        runner,
        ScriptUrls::from_settings(settings),
        &protector,
        &compiler,
    )
    .with_event_callback(Box::new(move |event: &PipelineEvent| {
        render_event(&spinner, event);
    }));

    match pipeline.run(config, prompter).await? {
        PipelineResult::Completed { artifact } => {
            print_success("PySuitcase packaging process completed successfully!");
            print_detail(&format!("Executable: {}", artifact.display()));
            if config.interactive() {
                print_info(
                    "To run this again without interactive prompts, use the following command:",
                );
                println!("{}", reproduce::to_command(config));
            }
            Ok(())
        }
        PipelineResult::Aborted => bail!("Build cancelled by user"),
    }
}

fn render_event(spinner: &Mutex<Option<ProgressBar>>, event: &PipelineEvent) {
    let Ok(mut current) = spinner.lock() else {
        return;
    };

    match event {
        PipelineEvent::Transition(state) => {
            if let Some(pb) = current.take() {
                pb.finish_and_clear();
            }
            match state {
                PipelineState::AcquiringRuntime
                | PipelineState::BootstrappingPackageManager
                | PipelineState::InstallingDependencies
                | PipelineState::ProtectingSource
                | PipelineState::Compiling => {
                    print_banner(&format!("{state}..."));
                    *current = Some(create_spinner(&state.to_string()));
                }
                PipelineState::Idle
                | PipelineState::Completed
                | PipelineState::Failed
                | PipelineState::Aborted => {}
            }
        }
        PipelineEvent::Warning(message) => match current.as_ref() {
            Some(pb) => pb.suspend(|| print_warning(message)),
            None => print_warning(message),
        },
        PipelineEvent::StageFinished(outcome) => {
            let report = || {
                print_success(&format!("{} complete", outcome.stage));
                if !outcome.stdout.trim().is_empty() {
                    tracing::info!("{}", outcome.stdout.trim_end());
                }
            };
            match current.as_ref() {
                Some(pb) => pb.suspend(report),
                None => report(),
            }
        }
    }
}
