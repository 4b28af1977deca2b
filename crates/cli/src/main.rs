mod cli;
mod commands;
mod config;
mod utils;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::{StdoutReporter, handle_extension_command};
use crate::config::Config;

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())
        .await?
        .with_overrides(cli.extensions_dir.clone(), cli.user_data_dir.clone());
    utils::bootstrap(&config).await?;

    let manager = utils::create_extension_manager(&config, Arc::new(StdoutReporter)).await?;

    match handle_extension_command(cli.lifecycle_command(), &manager).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            println!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
