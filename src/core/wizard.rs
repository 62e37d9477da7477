//! Interactive configuration wizard
//!
//! A step machine that asks for the build options in a fixed order through
//! a [`Prompter`]. It never touches the terminal itself, so it is driven by
//! a scripted prompter in tests and by [`crate::cli::prompt`] at runtime.
//!
//! The encryption decision comes right after the project directory because
//! it decides whether the target version and architecture are asked for.

use std::path::PathBuf;

use crate::config::defaults;
use crate::core::config::{Arch, RawOptions};
use crate::core::host::HostInfo;
use crate::core::resolver::{self, Resolution};
use crate::error::ConfigError;

/// Source of answers for the wizard and the pre-build confirmation
///
/// `Ok(None)` means the user ended the session (end of input); callers turn
/// it into a cancellation.
pub trait Prompter {
    /// Ask for a line of text; an empty answer yields `default`
    fn input(&mut self, question: &str, default: Option<&str>)
        -> Result<Option<String>, ConfigError>;

    /// Ask a yes/no question; an empty answer yields `default`
    fn confirm(&mut self, question: &str, default: bool) -> Result<Option<bool>, ConfigError>;

    /// Show an informational message
    fn notice(&mut self, message: &str);
}

/// Wizard steps, in the order they are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    /// Project root directory
    ProjectDir,
    /// Encrypt sources?
    Encrypt,
    /// Delete sources after encryption?
    DeleteSource,
    /// Second confirmation for deleting sources
    ConfirmDeleteSource,
    /// Target Python version
    PythonVersion,
    /// Target architecture
    Arch,
    /// Source folder name
    AppFolder,
    /// Entry script name
    MainScript,
    /// Requirements file name
    RequirementsFile,
    /// Use a mirror?
    UseMirror,
    /// Mirror URL
    MirrorUrl,
    /// Launcher icon
    Icon,
    /// Windowless launcher?
    NoWindow,
    /// All answers collected
    Done,
}

/// Collects [`RawOptions`] interactively
#[derive(Debug)]
pub struct Wizard<'a> {
    host: &'a HostInfo,
    default_mirror: &'a str,
    step: WizardStep,
    raw: RawOptions,
    delete_requested: bool,
    use_mirror: bool,
}

impl<'a> Wizard<'a> {
    /// Create a wizard positioned at its first step
    pub fn new(host: &'a HostInfo, default_mirror: &'a str) -> Self {
        Self {
            host,
            default_mirror,
            step: WizardStep::ProjectDir,
            raw: RawOptions {
                interactive: true,
                ..RawOptions::default()
            },
            delete_requested: false,
            use_mirror: false,
        }
    }

    /// Current step
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Run every step, then validate the collected options
    pub fn run(mut self, prompter: &mut dyn Prompter) -> Result<Resolution, ConfigError> {
        while self.step != WizardStep::Done {
            if !self.ask(prompter)? {
                tracing::info!("Wizard cancelled at {:?}", self.step);
                return Ok(Resolution::Cancelled);
            }
            self.step = self.next_step();
        }

        resolver::resolve(self.raw, self.host).map(Resolution::Resolved)
    }

    /// Step following the current one, given the answers so far
    pub fn next_step(&self) -> WizardStep {
        use WizardStep as S;
        match self.step {
            S::ProjectDir => S::Encrypt,
            S::Encrypt if self.raw.encrypt => S::DeleteSource,
            S::Encrypt => S::PythonVersion,
            S::DeleteSource if self.delete_requested => S::ConfirmDeleteSource,
            S::DeleteSource | S::ConfirmDeleteSource | S::Arch => S::AppFolder,
            S::PythonVersion => S::Arch,
            S::AppFolder => S::MainScript,
            S::MainScript => S::RequirementsFile,
            S::RequirementsFile => S::UseMirror,
            S::UseMirror if self.use_mirror => S::MirrorUrl,
            S::UseMirror | S::MirrorUrl => S::Icon,
            S::Icon => S::NoWindow,
            S::NoWindow | S::Done => S::Done,
        }
    }

    /// Ask the current step's question; `false` when the user cancelled
    fn ask(&mut self, prompter: &mut dyn Prompter) -> Result<bool, ConfigError> {
        use WizardStep as S;
        match self.step {
            S::ProjectDir => loop {
                let Some(answer) =
                    prompter.input("Enter the path to your project's root directory", None)?
                else {
                    return Ok(false);
                };
                let path = PathBuf::from(answer.trim());
                if !answer.trim().is_empty() && path.is_dir() {
                    self.raw.project_dir = Some(path);
                    return Ok(true);
                }
                prompter.notice(&format!("Error: Directory '{}' does not exist.", answer.trim()));
            },
            S::Encrypt => {
                let Some(encrypt) =
                    prompter.confirm("Encrypt Python source code for protection?", false)?
                else {
                    return Ok(false);
                };
                self.raw.encrypt = encrypt;
                if encrypt {
                    prompter.notice(&format!(
                        "Encryption enabled. Python version locked to host: {} ({})",
                        self.host.python_version().unwrap_or("unknown"),
                        self.host.arch()
                    ));
                } else {
                    prompter.notice(
                        "Encryption disabled. You can specify a target Python version.",
                    );
                }
                Ok(true)
            }
            S::DeleteSource => {
                let Some(delete) = prompter
                    .confirm("DELETE original .py source files after encryption?", false)?
                else {
                    return Ok(false);
                };
                self.delete_requested = delete;
                Ok(true)
            }
            S::ConfirmDeleteSource => {
                let Some(sure) =
                    prompter.confirm("This action is IRREVERSIBLE. Are you sure?", false)?
                else {
                    return Ok(false);
                };
                self.raw.delete_source_on_encrypt = sure;
                Ok(true)
            }
            S::PythonVersion => loop {
                let host_version = self.host.python_version();
                let question = match host_version {
                    Some(v) => format!("Enter target Python version (Default: {v})"),
                    None => "Enter target Python version".to_string(),
                };
                let Some(answer) = prompter.input(&question, host_version)? else {
                    return Ok(false);
                };
                let answer = answer.trim().to_string();
                if resolver::check_version(&answer).is_ok() {
                    self.raw.python_version = Some(answer);
                    return Ok(true);
                }
                prompter.notice(&format!(
                    "Error: '{answer}' is not a valid version (expected MAJOR.MINOR.PATCH)."
                ));
            },
            S::Arch => loop {
                let host_arch = self.host.arch().as_str();
                let Some(answer) = prompter.input(
                    &format!(
                        "Enter target architecture [{}] (Default: {host_arch})",
                        Arch::NAMES.join(", ")
                    ),
                    Some(host_arch),
                )?
                else {
                    return Ok(false);
                };
                match answer.parse::<Arch>() {
                    Ok(arch) => {
                        self.raw.arch = Some(arch);
                        return Ok(true);
                    }
                    Err(e) => prompter.notice(&format!("Error: {e}.")),
                }
            },
            S::AppFolder => {
                self.raw.app_folder = self.ask_name(
                    prompter,
                    "Enter the name of your source code folder",
                    defaults::DEFAULT_APP_FOLDER,
                )?;
                Ok(self.raw.app_folder.is_some())
            }
            S::MainScript => {
                self.raw.main_script = self.ask_name(
                    prompter,
                    "Enter the name of your main script",
                    defaults::DEFAULT_MAIN_SCRIPT,
                )?;
                Ok(self.raw.main_script.is_some())
            }
            S::RequirementsFile => {
                self.raw.requirements_file = self.ask_name(
                    prompter,
                    "Enter the name of your requirements file",
                    defaults::DEFAULT_REQUIREMENTS_FILE,
                )?;
                Ok(self.raw.requirements_file.is_some())
            }
            S::UseMirror => {
                let Some(use_mirror) = prompter.confirm(
                    "Do you want to use a PyPI mirror? (Recommended in some regions)",
                    false,
                )?
                else {
                    return Ok(false);
                };
                self.use_mirror = use_mirror;
                Ok(true)
            }
            S::MirrorUrl => {
                let Some(url) =
                    prompter.input("Enter the PyPI mirror URL", Some(self.default_mirror))?
                else {
                    return Ok(false);
                };
                self.raw.mirror = Some(url.trim().to_string());
                Ok(true)
            }
            S::Icon => {
                let Some(answer) = prompter.input(
                    "Enter path to a custom .ico file (or press Enter for default)",
                    Some(""),
                )?
                else {
                    return Ok(false);
                };
                let answer = answer.trim();
                if !answer.is_empty() {
                    self.raw.icon = Some(resolver::check_icon(answer.as_ref())?);
                }
                Ok(true)
            }
            S::NoWindow => {
                let Some(no_window) = prompter.confirm("Use windowless mode?", false)? else {
                    return Ok(false);
                };
                self.raw.no_window = no_window;
                Ok(true)
            }
            S::Done => Ok(true),
        }
    }

    fn ask_name(
        &self,
        prompter: &mut dyn Prompter,
        question: &str,
        default: &str,
    ) -> Result<Option<String>, ConfigError> {
        Ok(prompter
            .input(&format!("{question} (Default: {default})"), Some(default))?
            .map(|answer| answer.trim().to_string()))
    }
}
