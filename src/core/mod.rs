//! Core business logic module
//!
//! Configuration resolution and the build stages. Stages reach the outside
//! world only through [`crate::infra`] (downloads, processes, files), so
//! each can be driven by scripted collaborators in tests.
//!
//! # Submodules
//!
//! - [`config`] - Build configuration model
//! - [`host`] - Host interpreter detection
//! - [`resolver`] - Option validation (direct and wizard modes)
//! - [`wizard`] - Interactive configuration step machine
//! - [`mirror`] - Package index mirror arguments
//! - [`stage`] - Download-then-run stage execution
//! - [`runtime`] - Embedded runtime acquisition
//! - [`bootstrap`] - pip bootstrap
//! - [`dependencies`] - Two-phase dependency installation
//! - [`protect`] - Source protection
//! - [`launcher`] - Launcher compilation
//! - [`pipeline`] - Stage sequencing
//! - [`reproduce`] - Reproducible command rendering
//! - [`settings`] - Global settings

pub mod bootstrap;
pub mod config;
pub mod dependencies;
pub mod host;
pub mod launcher;
pub mod mirror;
pub mod pipeline;
pub mod protect;
pub mod reproduce;
pub mod resolver;
pub mod runtime;
pub mod settings;
pub mod stage;
pub mod wizard;
