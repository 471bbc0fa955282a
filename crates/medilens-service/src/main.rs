//! MediLens command-line front end.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use medilens_core::config::{APP_NAME, APP_VERSION};
use medilens_core::logging::init_logging;
use medilens_core::MediLens;
use medilens_service::cli::{execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_config()).context("failed to initialize logging")?;
    tracing::debug!("{} {} starting", APP_NAME, APP_VERSION);

    let config = cli.engine_config().context("failed to load configuration")?;
    let engine = Arc::new(MediLens::from_config(config).context("failed to start engine")?);

    let output = execute(&cli.command, engine).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
