//! Filesystem operations
//!
//! Handles scoped temporary files and path normalization.

use std::path::{Component, Path, PathBuf};

use crate::error::BuildError;

/// A file that is removed when the guard goes out of scope
///
/// Created before a helper script is downloaded so the script is removed
/// on every exit path of the stage that owns it, including early returns
/// and failed downloads.
#[derive(Debug)]
pub struct ScopedFile {
    path: PathBuf,
}

impl ScopedFile {
    /// Take ownership of `path`; the file need not exist yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the guarded file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        if self.path.exists() {
            let name = self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::info!("Cleaning up {name}...");
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!("Failed to remove {}: {e}", self.path.display());
            }
        }
    }
}

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), BuildError> {
    std::fs::create_dir_all(path).map_err(|e| BuildError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents, if present
pub fn remove_dir_all(path: &Path) -> Result<(), BuildError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| BuildError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Remove a file, if present
pub fn remove_file(path: &Path) -> Result<(), BuildError> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| BuildError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Write content to a file, creating parent directories
pub fn write_file(path: &Path, content: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| BuildError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Prefix the file at `path` with a UTF-8 byte order mark unless it has one
///
/// Windows PowerShell 5.1 reads BOM-less scripts in the ANSI code page.
pub fn ensure_utf8_bom(path: &Path) -> std::io::Result<()> {
    let content = std::fs::read(path)?;
    if content.starts_with(UTF8_BOM) {
        return Ok(());
    }
    let mut marked = Vec::with_capacity(UTF8_BOM.len() + content.len());
    marked.extend_from_slice(UTF8_BOM);
    marked.extend_from_slice(&content);
    std::fs::write(path, marked)
}

/// Make `path` absolute against the current directory
///
/// `.` components are dropped and `..` removes the preceding segment
/// (never the root); the path is not required to exist and symlinks are
/// not resolved.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                }
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
