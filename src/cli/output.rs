//! Output formatting and progress indicators
//!
//! Colored status lines, stage banners and spinners. Everything except
//! errors is suppressed in quiet mode.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{BuildError, PysuitcaseError, StageError};

static QUIET: AtomicBool = AtomicBool::new(false);
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

/// Output preferences taken from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Only print errors
    pub quiet: bool,
    /// `-v` count
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, verbose: u8) -> Self {
        Self { quiet, verbose }
    }

    /// Make these preferences visible to the print helpers
    pub fn apply_global(self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
        VERBOSITY.store(self.verbose, Ordering::Relaxed);
    }

    /// Log filter directive for this verbosity
    pub fn log_level(self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, _) => "debug",
        }
    }
}

/// Whether quiet mode is on
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Whether `-v` was given at least once
pub fn is_verbose() -> bool {
    VERBOSITY.load(Ordering::Relaxed) > 0
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

const RULE: &str = "-------------------------------------";

pub fn print_success(message: &str) {
    if !is_quiet() {
        println!("{} {}", status::SUCCESS.green(), message.green());
    }
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", status::ERROR.red(), message.red());
}

pub fn print_warning(message: &str) {
    if !is_quiet() {
        eprintln!("{} {}", status::WARNING.yellow(), message.yellow());
    }
}

pub fn print_info(message: &str) {
    if !is_quiet() {
        println!("{} {message}", status::INFO.blue());
    }
}

/// Indented plain line
pub fn print_detail(message: &str) {
    if !is_quiet() {
        println!("  {message}");
    }
}

/// Separator plus bold cyan heading
pub fn print_banner(title: &str) {
    if !is_quiet() {
        println!("\n{RULE}");
        println!("{}", title.cyan().bold());
    }
}

/// Block of text framed by separators
pub fn print_block(text: &str) {
    if !is_quiet() {
        println!("\n{RULE}");
        print!("{text}");
        println!("{RULE}\n");
    }
}

/// Create a spinner for a stage of unknown duration
///
/// Hidden in quiet mode.
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Print an error and any captured tool output
///
/// The cause chain is included with `-v`.
pub fn display_error(error: &anyhow::Error) {
    print_error(&format!("Error: {error}"));
    if is_verbose() {
        for cause in error.chain().skip(1) {
            eprintln!("  {} {cause}", "caused by:".dark_grey());
        }
    }

    let Some(err) = error.downcast_ref::<PysuitcaseError>() else {
        return;
    };
    let PysuitcaseError::Build(build) = err else {
        return;
    };

    let (stdout, stderr) = captured_output(build);
    if let Some(stdout) = stdout.filter(|s| !s.trim().is_empty()) {
        eprintln!("{stdout}");
    }
    if let Some(stderr) = stderr.filter(|s| !s.trim().is_empty()) {
        eprintln!("{}", stderr.red());
    }

    if let Some(hint) = hint_for(build) {
        eprintln!("\n{}", hint.yellow());
    }
}

fn captured_output(error: &BuildError) -> (Option<&str>, Option<&str>) {
    match error {
        BuildError::RuntimeAcquisition {
            source: StageError::Process(e),
        }
        | BuildError::Bootstrap {
            source: StageError::Process(e),
        }
        | BuildError::Protection { source: Some(e), .. }
        | BuildError::Compilation { source: Some(e), .. } => (e.stdout(), e.stderr()),
        BuildError::DependencyInstall { stdout, stderr, .. } => {
            (Some(stdout.as_str()), Some(stderr.as_str()))
        }
        _ => (None, None),
    }
}

/// Suggestion for a failure with a well-known cause
pub fn hint_for(error: &BuildError) -> Option<&'static str> {
    match error {
        BuildError::RuntimeAcquisition {
            source: StageError::Process(_),
        } => Some(
            "Hint: Make sure you have 'Desktop development with C++' installed via Visual Studio Installer.",
        ),
        BuildError::Protection { .. } => Some(
            "Hint: Encryption needs Cython and a C compiler for the host interpreter (pip install cython).",
        ),
        BuildError::Compilation { .. } => Some(
            "Hint: Run pysuitcase from a Visual Studio Developer Command Prompt so 'cl' and 'rc' are on PATH.",
        ),
        _ => None,
    }
}
