//! Command-line interface module
//!
//! This module handles argument parsing, prompting and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod build;
pub mod output;
pub mod prompt;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::Parser;

use crate::core::config::{Arch, RawOptions};
use crate::core::host::HostInfo;
use crate::core::resolver::{self, Resolution};
use crate::core::settings::Settings;
use crate::infra::dirs::PysuitcaseDirs;
use crate::infra::process::SystemProcessRunner;
use output::print_info;
use prompt::TerminalPrompter;

/// pysuitcase - Package a Python project as a standalone Windows executable
///
/// Without PROJECT_DIR an interactive wizard asks for every option.
#[derive(Parser, Debug)]
#[command(name = "pysuitcase")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project root directory (omit for interactive mode)
    pub project_dir: Option<PathBuf>,

    /// Name of the folder containing your source code [default: app]
    #[arg(long)]
    pub app_folder: Option<String>,

    /// Name of the main script file [default: app.py]
    #[arg(long)]
    pub main_script: Option<String>,

    /// Name of the requirements file [default: requirements.txt]
    #[arg(long)]
    pub requirements_file: Option<String>,

    /// Target Python version. Incompatible with --encrypt
    #[arg(long)]
    pub python_version: Option<String>,

    /// Target architecture. Incompatible with --encrypt
    #[arg(
        long,
        ignore_case = true,
        value_parser = PossibleValuesParser::new(Arch::NAMES).try_map(|s| s.parse::<Arch>())
    )]
    pub arch: Option<Arch>,

    /// Path to a .ico file for the launcher
    #[arg(long)]
    pub icon: Option<PathBuf>,

    /// PyPI mirror URL
    #[arg(long)]
    pub mirror: Option<String>,

    /// Compile the source code to protect it (uses the host's Python)
    #[arg(long)]
    pub encrypt: bool,

    /// Delete original .py files after encryption. IRREVERSIBLE
    #[arg(long)]
    pub delete_source_on_encrypt: bool,

    /// Use a windowless launcher for the final executable
    #[arg(long)]
    pub no_window: bool,

    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Options as given, before any validation
    pub fn raw_options(&self) -> RawOptions {
        RawOptions {
            project_dir: self.project_dir.clone(),
            app_folder: self.app_folder.clone(),
            main_script: self.main_script.clone(),
            requirements_file: self.requirements_file.clone(),
            python_version: self.python_version.clone(),
            arch: self.arch,
            icon: self.icon.clone(),
            mirror: self.mirror.clone(),
            encrypt: self.encrypt,
            delete_source_on_encrypt: self.delete_source_on_encrypt,
            no_window: self.no_window,
            interactive: false,
        }
    }

    /// Resolve the configuration and run the build
    pub async fn run(self) -> Result<()> {
        let raw = self.raw_options();
        // Conflicting flags fail before anything is probed or asked
        resolver::check_protection_lock(&raw)?;

        let dirs = PysuitcaseDirs::new();
        let settings = Settings::load(&dirs).context("Failed to load global settings")?;

        let runner = SystemProcessRunner;
        let host = HostInfo::detect(&runner, settings.host_python());
        let mut prompter = TerminalPrompter::stdio();

        if raw.project_dir.is_some() {
            print_info("Running in direct mode...");
        } else {
            print_info("Entering interactive mode...");
        }

        let config =
            match resolver::resolve_session(raw, &host, &mut prompter, settings.default_mirror())? {
                Resolution::Resolved(config) => config,
                Resolution::Cancelled => bail!("Cancelled by user"),
            };

        build::execute(&config, &settings, &host, &runner, &mut prompter).await
    }
}
