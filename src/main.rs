//! pysuitcase CLI - Package a Python project as a standalone Windows executable
//!
//! Entry point for the pysuitcase command-line application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pysuitcase::cli::output::{display_error, OutputConfig};
use pysuitcase::cli::Cli;
use pysuitcase::error::PysuitcaseError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output_config = OutputConfig::new(cli.quiet, cli.verbose);
    output_config.apply_global();

    // RUST_LOG wins over -v/-q
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(output_config.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            let code = e
                .downcast_ref::<PysuitcaseError>()
                .map_or(1, PysuitcaseError::exit_code);
            std::process::exit(code);
        }
    }
}
