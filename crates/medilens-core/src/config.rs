//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! Environment variables override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Outlet;

pub const APP_NAME: &str = "MediLens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_DATA_DIR: &str = "MEDILENS_DATA_DIR";
pub const ENV_CATALOG: &str = "MEDILENS_CATALOG";
pub const ENV_LIVE_TIMEOUT: &str = "MEDILENS_LIVE_TIMEOUT_SECS";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,medilens_core=info,medilens_service=info"
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Per-token bounds for the tiered resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TierLimits {
    pub exact_cap: usize,
    pub prefix_cap: usize,
    pub substring_cap: usize,
    pub ingredient_cap: usize,
    /// Shortest token (in characters) allowed into the substring tiers
    pub min_substring_len: usize,
    /// Cap on distinct brand names per resolution
    pub max_results: usize,
}

impl Default for TierLimits {
    fn default() -> Self {
        Self {
            exact_cap: 5,
            prefix_cap: 5,
            substring_cap: 3,
            ingredient_cap: 3,
            min_substring_len: 4,
            max_results: 50,
        }
    }
}

/// Best-effort live outlet probing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LiveConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 5,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory searched for a catalog file
    pub data_dir: PathBuf,
    /// Explicit catalog file, overriding discovery in `data_dir`
    pub catalog_path: Option<PathBuf>,
    pub tiers: TierLimits,
    pub substitutes_limit: usize,
    /// Shortest accepted manual search query
    pub min_query_len: usize,
    pub suggestion_limit: usize,
    pub outlets: Vec<Outlet>,
    pub currency: String,
    pub live: LiveConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            catalog_path: None,
            tiers: TierLimits::default(),
            substitutes_limit: 10,
            min_query_len: 2,
            suggestion_limit: 5,
            outlets: default_outlets(),
            currency: "INR".to_string(),
            live: LiveConfig::default(),
        }
    }
}

/// The built-in outlet table.
pub fn default_outlets() -> Vec<Outlet> {
    vec![
        Outlet::new("1mg", 0.95, "5% off", "2-3 days"),
        Outlet::new("PharmEasy", 0.92, "8% off", "1-2 days"),
        Outlet::new("Netmeds", 0.97, "3% off", "2-4 days"),
        Outlet::new("Apollo Pharmacy", 1.05, "Walk-in discount", "Same day"),
        Outlet::new("MedPlus", 0.98, "2% off", "1-2 days"),
        Outlet::new("Local Pharmacy", 1.00, "No discount", "Instant"),
    ]
}

impl EngineConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup(ENV_CATALOG) {
            self.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup(ENV_LIVE_TIMEOUT) {
            self.live.timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{} must be a whole number of seconds", ENV_LIVE_TIMEOUT))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings that would make the engine misbehave.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.outlets.is_empty() {
            return Err(ConfigError::Invalid("outlet table is empty".into()));
        }
        if let Some(outlet) = self
            .outlets
            .iter()
            .find(|o| !o.multiplier.is_finite() || o.multiplier < 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "outlet {} has invalid multiplier {}",
                outlet.name, outlet.multiplier
            )));
        }
        let tiers = &self.tiers;
        if [
            tiers.exact_cap,
            tiers.prefix_cap,
            tiers.substring_cap,
            tiers.ingredient_cap,
            tiers.max_results,
        ]
        .contains(&0)
        {
            return Err(ConfigError::Invalid("tier caps must be positive".into()));
        }
        if self.live.timeout_secs == 0 {
            return Err(ConfigError::Invalid("live timeout must be positive".into()));
        }
        Ok(())
    }
}
