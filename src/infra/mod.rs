//! Infrastructure layer
//!
//! Handles all I/O operations: network, filesystem, and external processes.
//!
//! - [`dirs`] - Platform config directory
//! - [`download`] - Helper script downloads
//! - [`filesystem`] - Scoped temporary files and directory helpers
//! - [`process`] - External process execution

pub mod dirs;
pub mod download;
pub mod filesystem;
pub mod process;
