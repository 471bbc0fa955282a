//! Price comparison with an informational live report.

use std::sync::Arc;
use std::time::Duration;

use medilens_core::models::{PriceComparison, QueryOutcome};
use medilens_core::{MediLens, MediLensError, MediLensResult};
use serde::{Deserialize, Serialize};

use crate::probes::{probe_all, LiveAvailability, OutletProbe};

/// Deterministic comparison plus what the live probes saw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LivePriceReport {
    pub comparison: PriceComparison,
    /// Empty when live probing is disabled
    pub live: Vec<LiveAvailability>,
}

/// Runs price comparisons, optionally probing outlets alongside.
pub struct PriceService {
    engine: Arc<MediLens>,
    probes: Vec<Arc<dyn OutletProbe>>,
    timeout: Duration,
}

impl PriceService {
    pub fn new(engine: Arc<MediLens>, probes: Vec<Arc<dyn OutletProbe>>) -> Self {
        let timeout = Duration::from_secs(engine.config().live.timeout_secs);
        Self {
            engine,
            probes,
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn engine(&self) -> &Arc<MediLens> {
        &self.engine
    }

    /// Compare prices for `name`, probing live outlets when `live` is set and
    /// enabled in config.
    ///
    /// The comparison is exactly what the engine computes on its own. Catalog
    /// work, including suggestion scans on a miss, runs on the blocking pool.
    pub async fn compare(
        &self,
        name: &str,
        live: bool,
    ) -> MediLensResult<QueryOutcome<LivePriceReport>> {
        let engine = Arc::clone(&self.engine);
        let query = name.to_string();
        let outcome = tokio::task::spawn_blocking(move || engine.compare_prices(&query))
            .await
            .map_err(|e| MediLensError::Internal(format!("Price lookup task failed: {e}")))??;

        let comparison = match outcome {
            QueryOutcome::Found(comparison) => comparison,
            other => {
                return Ok(other.map(|comparison| LivePriceReport {
                    comparison,
                    live: Vec::new(),
                }))
            }
        };

        let live = if live && self.engine.config().live.enabled {
            let results = probe_all(&self.probes, &comparison.medicine, self.timeout).await;
            tracing::info!(
                medicine = %comparison.medicine,
                probed = results.len(),
                "Live outlet probes finished"
            );
            results
        } else {
            Vec::new()
        };

        Ok(QueryOutcome::Found(LivePriceReport { comparison, live }))
    }
}
