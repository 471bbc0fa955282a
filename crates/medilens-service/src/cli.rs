//! Command-line arguments and command dispatch for `medilens`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use medilens_core::config::{ConfigResult, EngineConfig, APP_NAME};
use medilens_core::logging::{LogConfig, LogFormat};
use medilens_core::{MediLens, MediLensError};
use serde::Serialize;
use thiserror::Error;

use crate::probes::{default_probes, ProbeError};
use crate::service::PriceService;

#[derive(Parser, Debug)]
#[command(
    name = "medilens",
    version,
    about = "Find medicines in prescription text, their substitutes and outlet prices"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON configuration file.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Catalog CSV file, overriding discovery in the data directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format: compact, pretty or json.
    #[arg(long = "log-format", default_value = "compact", global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show whether a catalog is loaded and how many medicines it holds.
    Status,

    /// Detect catalog medicines in OCR text.
    Detect {
        /// Text to scan.
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file instead.
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Search brand names containing a query, with substitutes.
    Search { query: String },

    /// Show details for one medicine.
    Info { name: String },

    /// List cheaper medicines with the same composition.
    Substitutes { name: String },

    /// Compare outlet prices for one medicine.
    Price {
        name: String,

        /// Also probe live outlet search pages (informational only).
        #[arg(long)]
        live: bool,
    },
}

/// Errors raised while running a command.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Engine(#[from] MediLensError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Probe setup failed: {0}")]
    Probe(#[from] ProbeError),
}

pub type CommandResult<T> = Result<T, CommandError>;

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from_verbosity(self.verbose).with_format(self.log_format)
    }

    /// Config file (or defaults), then environment, then `--catalog`.
    pub fn engine_config(&self) -> ConfigResult<EngineConfig> {
        let config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        };
        let mut config = config.with_env_overrides()?;
        if let Some(catalog) = &self.catalog {
            config.catalog_path = Some(catalog.clone());
        }
        Ok(config)
    }
}

/// Run one command and return its outcome as JSON.
pub async fn execute(command: &Command, engine: Arc<MediLens>) -> CommandResult<serde_json::Value> {
    tracing::debug!(app = APP_NAME, ?command, "Running command");
    match command {
        Command::Status => to_json(engine.status()?),
        Command::Detect { text, file } => {
            let text = match (text, file) {
                (_, Some(path)) => std::fs::read_to_string(path)?,
                (Some(text), None) => text.clone(),
                (None, None) => String::new(),
            };
            to_json(engine.detect(&text)?)
        }
        Command::Search { query } => to_json(engine.search(query)?),
        Command::Info { name } => to_json(engine.info(name)?),
        Command::Substitutes { name } => to_json(engine.substitutes(name)?),
        Command::Price { name, live } => {
            let timeout = Duration::from_secs(engine.config().live.timeout_secs);
            let probes = if *live { default_probes(timeout)? } else { Vec::new() };
            let service = PriceService::new(engine, probes);
            to_json(service.compare(name, *live).await?)
        }
    }
}

fn to_json<T: Serialize>(value: T) -> CommandResult<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}
