//! pysuitcase - Package a Python project as a standalone Windows executable
//!
//! Provisions an embeddable Python runtime inside the project, installs the
//! project's dependencies into it, optionally compiles the sources, and
//! builds a small native launcher that runs the entry script with that
//! runtime.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Configuration resolution and build stages
//! - [`infra`] - Infrastructure layer (network, filesystem, processes)
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
