//! Configuration constants
//!
//! - [`defaults`] - Default option values and well-known file names
//! - [`urls`] - Download locations of the helper scripts

pub mod defaults;
pub mod urls;
