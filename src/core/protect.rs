//! Source protection
//!
//! Compiles application modules to native extensions so the plaintext
//! sources need not ship. The entry script stays a plain `.py` file since
//! the interpreter is launched on it directly.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::defaults;
use crate::core::stage::{StageId, StageOutcome};
use crate::error::BuildError;
use crate::infra::filesystem;
use crate::infra::process::{ProcessCommand, ProcessRunner};

/// Transforms application sources in place
pub trait SourceProtector: Send + Sync {
    /// Protect the sources under `app_dir`
    ///
    /// With `delete_originals`, plaintext sources that were protected are
    /// removed once every compiled artifact is in place.
    fn protect(&self, app_dir: &Path, delete_originals: bool) -> Result<StageOutcome, BuildError>;
}

/// [`SourceProtector`] compiling modules with Cython on the host interpreter
pub struct CythonProtector<'a> {
    runner: &'a dyn ProcessRunner,
    python: PathBuf,
    main_script: String,
}

impl<'a> CythonProtector<'a> {
    /// `python` is the host interpreter; `main_script` is left untouched
    pub fn new(runner: &'a dyn ProcessRunner, python: PathBuf, main_script: &str) -> Self {
        Self {
            runner,
            python,
            main_script: main_script.to_string(),
        }
    }

    /// Modules under `app_dir` that get compiled, sorted
    pub fn collect_modules(&self, app_dir: &Path) -> Vec<PathBuf> {
        let main = app_dir.join(&self.main_script);
        let mut modules: Vec<PathBuf> = WalkDir::new(app_dir)
            .into_iter()
            .filter_entry(|e| e.file_name() != "__pycache__")
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| p.extension() == Some(OsStr::new("py")) && *p != main)
            .collect();
        modules.sort();
        modules
    }
}

impl SourceProtector for CythonProtector<'_> {
    fn protect(&self, app_dir: &Path, delete_originals: bool) -> Result<StageOutcome, BuildError> {
        let modules = self.collect_modules(app_dir);
        if modules.is_empty() {
            tracing::warn!("No modules to encrypt under {}", app_dir.display());
            return Ok(StageOutcome {
                stage: StageId::ProtectSource,
                success: true,
                stdout: String::new(),
                stderr: String::new(),
                artifact: None,
            });
        }

        // Cython writes `<stem>.c` beside each module; never clobber a user's file
        let clashes: Vec<String> = modules
            .iter()
            .map(|m| m.with_extension("c"))
            .filter(|c| c.exists())
            .map(|c| c.display().to_string())
            .collect();
        if !clashes.is_empty() {
            return Err(BuildError::Protection {
                message: format!(
                    "{} already exist(s) and would be overwritten by Cython",
                    clashes.join(", ")
                ),
                source: None,
            });
        }
        let build_dir = app_dir.join(defaults::CYTHON_BUILD_DIR);
        let had_build_dir = build_dir.exists();

        tracing::info!("Compiling {} module(s) with Cython", modules.len());
        let command = ProcessCommand::new(&self.python)
            .args(["-m", "Cython.Build.Cythonize", "-i", "-3"])
            .args(&modules)
            .current_dir(app_dir);
        let output = self
            .runner
            .run(&command)
            .map_err(|source| BuildError::Protection {
                message: "Cython compilation failed".to_string(),
                source: Some(source),
            })?;

        for module in &modules {
            filesystem::remove_file(&module.with_extension("c"))?;
        }
        if had_build_dir {
            tracing::debug!("Keeping existing {}", build_dir.display());
        } else {
            filesystem::remove_dir_all(&build_dir)?;
        }

        let missing: Vec<String> = modules
            .iter()
            .filter(|m| !has_extension_module(m))
            .map(|m| m.display().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::Protection {
                message: format!("no compiled module produced for {}", missing.join(", ")),
                source: None,
            });
        }

        if delete_originals {
            for module in &modules {
                tracing::info!("Deleting source {}", module.display());
                filesystem::remove_file(module)?;
            }
        }

        Ok(StageOutcome::from_output(
            StageId::ProtectSource,
            output,
            Some(app_dir.to_path_buf()),
        ))
    }
}

/// `<stem>.<tag>.pyd` or `<stem>.<tag>.so` next to `module`
fn has_extension_module(module: &Path) -> bool {
    let (Some(dir), Some(stem)) = (module.parent(), module.file_stem()) else {
        return false;
    };
    let prefix = format!("{}.", stem.to_string_lossy());

    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries.filter_map(Result::ok).any(|entry| {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            name.starts_with(&prefix)
                && matches!(
                    path.extension().and_then(OsStr::to_str),
                    Some("pyd" | "so")
                )
        })
    })
}
