//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use assert_fs::prelude::*;
use assert_fs::TempDir;

/// Test project context
///
/// A scratch Python project plus an isolated config directory, so the
/// user's own `config.toml` never leaks into a test.
pub struct TestProject {
    /// Project root
    pub dir: TempDir,
    /// Config directory passed through `PYSUITCASE_CONFIG_DIR`
    pub config_dir: TempDir,
}

impl TestProject {
    /// Empty project directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            config_dir: TempDir::new().expect("Failed to create config directory"),
        }
    }

    /// Project with `app/app.py` and `app/requirements.txt`
    pub fn with_app() -> Self {
        let project = Self::new();
        project.create_file("app/app.py", SAMPLE_MAIN);
        project.create_file("app/requirements.txt", "rich\n");
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        self.dir
            .child(name)
            .write_str(content)
            .expect("Failed to write file");
    }

    /// Write the global `config.toml`
    pub fn write_settings(&self, content: &str) {
        self.config_dir
            .child("config.toml")
            .write_str(content)
            .expect("Failed to write settings");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Command running the binary against this project's config directory
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pysuitcase"));
        cmd.env("PYSUITCASE_CONFIG_DIR", self.config_dir.path())
            .env_remove("RUST_LOG")
            .current_dir(self.dir.path());
        cmd
    }

    /// Run with `args`; stdin is closed
    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute pysuitcase")
    }

    /// Run with `args`, feeding `input` on stdin
    pub fn run_with_input(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn pysuitcase");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .expect("Failed to write stdin");
        child.wait_with_output().expect("Failed to wait for pysuitcase")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Path as a command-line argument
pub fn arg(path: &Path) -> String {
    path.display().to_string()
}

/// Stdout and stderr joined
pub fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Minimal entry script
pub const SAMPLE_MAIN: &str = r#"
import sys

def main():
    print("hello from", sys.executable)

if __name__ == "__main__":
    main()
"#;
