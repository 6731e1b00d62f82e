pub mod cli;
pub mod console;
pub mod report;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

const ENV_TIMELINE_LOGLEVEL: &str = "TIMELINE_LOGLEVEL";

/// Main entry point for the CLI
#[tokio::main]
pub async fn cli_main(args: Vec<String>) -> Result<()> {
    // Ignore the error if a logger is already installed
    let _ = env_logger::try_init_from_env(Env::new().filter_or(ENV_TIMELINE_LOGLEVEL, "info"));
    cli::Cli::parse_from(args).run().await
}
