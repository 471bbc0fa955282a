//! Request facade over a hot-swappable catalog.
//!
//! Every operation takes one catalog snapshot at entry and runs entirely on
//! it, so a concurrent [`MediLens::reload`] never changes a request midway.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{
    locate_catalog, Catalog, CatalogField, CatalogHandle, CatalogLoader, CatalogStatus, LoadReport,
};
use crate::config::EngineConfig;
use crate::models::{
    Detection, DrugInfo, DrugRecord, GenericAlternative, PriceComparison, QueryOutcome,
    ResolvedMatch,
};
use crate::pricing::PriceSynthesizer;
use crate::resolver::{suggest_brands, Resolver, SubstituteGrouper};
use crate::{MediLensError, MediLensResult};

/// The medicine matching engine.
pub struct MediLens {
    config: EngineConfig,
    catalog: CatalogHandle,
    synthesizer: PriceSynthesizer,
}

impl MediLens {
    /// Create an engine over an already-built catalog.
    pub fn new(config: EngineConfig, catalog: Catalog) -> MediLensResult<Self> {
        config.validate()?;
        let synthesizer =
            PriceSynthesizer::new(config.outlets.clone()).with_currency(config.currency.clone());
        Ok(Self {
            config,
            catalog: CatalogHandle::new(catalog),
            synthesizer,
        })
    }

    /// Create an engine and load its catalog from the configured location.
    ///
    /// A missing or unreadable catalog leaves the engine running on an empty
    /// catalog; every operation then reports the database as not loaded.
    pub fn from_config(config: EngineConfig) -> MediLensResult<Self> {
        let catalog = match catalog_location(&config, None) {
            Ok(path) => Catalog::load(&path),
            Err(e) => {
                tracing::warn!(error = %e, "No catalog file found, serving empty catalog");
                Catalog::empty()
            }
        };
        Self::new(config, catalog)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The catalog currently being served.
    pub fn catalog(&self) -> MediLensResult<Arc<Catalog>> {
        Ok(self.catalog.snapshot()?)
    }

    pub fn status(&self) -> MediLensResult<CatalogStatus> {
        Ok(self.catalog()?.status())
    }

    /// Build a new catalog and swap it in.
    ///
    /// Unlike startup, a failed reload is an error and the current catalog
    /// stays in place.
    pub fn reload(&self, path: Option<&Path>) -> MediLensResult<LoadReport> {
        let path = catalog_location(&self.config, path)?;
        let (catalog, report) = CatalogLoader::load_path(&path)?;
        self.catalog.swap(catalog)?;
        tracing::info!(
            path = %path.display(),
            rows_kept = report.rows_kept,
            discontinued = report.discontinued,
            "Reloaded medicine catalog"
        );
        Ok(report)
    }

    // =========================================================================
    // Request Operations
    // =========================================================================

    /// Find catalog brands mentioned in OCR text.
    pub fn detect(&self, raw_text: &str) -> MediLensResult<QueryOutcome<Detection>> {
        if raw_text.trim().is_empty() {
            return Err(MediLensError::InvalidInput("No text provided".into()));
        }
        let catalog = self.catalog()?;
        if catalog.is_empty() {
            return Ok(QueryOutcome::DatabaseNotLoaded);
        }
        let resolver = Resolver::with_limits(&catalog, self.config.tiers.clone());
        Ok(QueryOutcome::Found(resolver.detect(raw_text)))
    }

    /// Manual search: every brand containing `query`, with its substitutes.
    pub fn search(&self, query: &str) -> MediLensResult<QueryOutcome<Vec<ResolvedMatch>>> {
        let query = query.trim();
        if query.chars().count() < self.config.min_query_len {
            return Err(MediLensError::InvalidInput("Query too short".into()));
        }
        let catalog = self.catalog()?;
        if catalog.is_empty() {
            return Ok(QueryOutcome::DatabaseNotLoaded);
        }

        let grouper = SubstituteGrouper::with_limit(&catalog, self.config.substitutes_limit);
        let results: Vec<ResolvedMatch> = catalog
            .lookup_contains(CatalogField::BrandName, query)
            .into_iter()
            .take(self.config.tiers.max_results)
            .map(|record| ResolvedMatch {
                drug: DrugInfo::from(record),
                generics: grouper.alternatives(record),
            })
            .collect();

        if results.is_empty() {
            return Ok(self.not_found(&catalog, query, "No matches found"));
        }
        tracing::info!(query, results = results.len(), "Search completed");
        Ok(QueryOutcome::Found(results))
    }

    /// Detail view of one medicine by exact brand name.
    pub fn info(&self, name: &str) -> MediLensResult<QueryOutcome<DrugInfo>> {
        self.with_exact(name, "Medicine not found", |_, record| {
            QueryOutcome::Found(DrugInfo::from(record))
        })
    }

    /// Substitutes of one medicine, cheapest first.
    pub fn substitutes(&self, name: &str) -> MediLensResult<QueryOutcome<Vec<GenericAlternative>>> {
        let limit = self.config.substitutes_limit;
        self.with_exact(name, "Medicine not found", |catalog, record| {
            QueryOutcome::Found(SubstituteGrouper::with_limit(catalog, limit).alternatives(record))
        })
    }

    /// Synthesized outlet prices for one medicine.
    pub fn compare_prices(&self, name: &str) -> MediLensResult<QueryOutcome<PriceComparison>> {
        self.with_exact(name, "Medicine not found in database", |_, record| {
            let Some(base_price) = record.known_price() else {
                return QueryOutcome::not_found(
                    record.brand_name.clone(),
                    "No catalog price recorded for this medicine",
                );
            };
            match self
                .synthesizer
                .compare(&record.brand_name, &record.active_ingredient, base_price)
            {
                Some(comparison) => QueryOutcome::Found(comparison),
                None => QueryOutcome::not_found(record.brand_name.clone(), "No outlets configured"),
            }
        })
    }

    /// Run `found` on the first record whose brand equals `name`.
    fn with_exact<T>(
        &self,
        name: &str,
        missing: &str,
        found: impl FnOnce(&Catalog, &DrugRecord) -> QueryOutcome<T>,
    ) -> MediLensResult<QueryOutcome<T>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MediLensError::InvalidInput("No medicine name provided".into()));
        }
        let catalog = self.catalog()?;
        if catalog.is_empty() {
            return Ok(QueryOutcome::DatabaseNotLoaded);
        }
        match catalog.lookup_exact(name).first() {
            Some(&record) => Ok(found(catalog.as_ref(), record)),
            None => Ok(self.not_found(&catalog, name, missing)),
        }
    }

    fn not_found<T>(&self, catalog: &Catalog, query: &str, message: &str) -> QueryOutcome<T> {
        QueryOutcome::NotFound {
            query: query.to_string(),
            message: message.to_string(),
            suggestions: suggest_brands(catalog, query, self.config.suggestion_limit),
        }
    }
}

/// Explicit path, then the configured path, then discovery in `data_dir`.
fn catalog_location(config: &EngineConfig, explicit: Option<&Path>) -> MediLensResult<PathBuf> {
    if let Some(path) = explicit.or(config.catalog_path.as_deref()) {
        return Ok(path.to_path_buf());
    }
    Ok(locate_catalog(&config.data_dir)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_engine() -> MediLens {
        let catalog = Catalog::from_records(vec![
            DrugRecord::new("Drotin", "Drotaverine").with_price(40.0),
            DrugRecord::new("Drotikind", "Drotaverine").with_price(34.0),
            DrugRecord::new("Azee", "Azithromycin").with_price(100.0),
            DrugRecord::new("Azithral", "Azithromycin").with_price(110.0),
            DrugRecord::new("Calpol", "Paracetamol"),
        ]);
        MediLens::new(EngineConfig::default(), catalog).unwrap()
    }

    fn empty_engine() -> MediLens {
        MediLens::new(EngineConfig::default(), Catalog::empty()).unwrap()
    }

    #[test]
    fn test_detect() {
        let engine = setup_engine();
        let detection = engine.detect("Take Azee-500 twice daily").unwrap().found().unwrap();
        assert_eq!(detection.detected_medicines, vec!["Azee"]);
    }

    #[test]
    fn test_search_with_generics() {
        let engine = setup_engine();
        let results = engine.search("drot").unwrap().found().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].drug.brand_name, "Drotin");
        assert_eq!(results[0].generics[0].brand_name, "Drotikind");
    }

    #[test]
    fn test_search_query_too_short() {
        let engine = setup_engine();
        assert!(matches!(engine.search("a"), Err(MediLensError::InvalidInput(_))));
        assert!(matches!(engine.search("  "), Err(MediLensError::InvalidInput(_))));
    }

    #[test]
    fn test_info_miss_suggests() {
        let engine = setup_engine();
        match engine.info("Azithrall").unwrap() {
            QueryOutcome::NotFound { suggestions, .. } => {
                assert_eq!(suggestions.first().map(String::as_str), Some("Azithral"));
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_info_found() {
        let engine = setup_engine();
        let info = engine.info("calpol").unwrap().found().unwrap();
        assert_eq!(info.brand_name, "Calpol");
        assert_eq!(info.precautions, "Consult your doctor");
        assert_eq!(info.price, None);
    }

    #[test]
    fn test_substitutes() {
        let engine = setup_engine();
        let subs = engine.substitutes("Drotin").unwrap().found().unwrap();
        let names: Vec<&str> = subs.iter().map(|s| s.brand_name.as_str()).collect();
        assert_eq!(names, vec!["Drotikind"]);
    }

    #[test]
    fn test_compare_prices() {
        let engine = setup_engine();
        let comparison = engine.compare_prices("Azee").unwrap().found().unwrap();
        assert_eq!(comparison.best_outlet, "PharmEasy");
        assert_eq!(comparison.cheapest_price, 92.0);
        assert_eq!(comparison.savings_percent, 8.0);
        assert_eq!(comparison.offers.len(), 6);
    }

    #[test]
    fn test_compare_prices_unknown_price_not_found() {
        let engine = setup_engine();
        let outcome = engine.compare_prices("Calpol").unwrap();
        assert!(matches!(outcome, QueryOutcome::NotFound { .. }));
    }

    #[test]
    fn test_empty_catalog_reports_not_loaded() {
        let engine = empty_engine();
        assert!(!engine.status().unwrap().loaded);
        assert_eq!(engine.detect("Azee 500").unwrap(), QueryOutcome::DatabaseNotLoaded);
        assert_eq!(engine.search("Azee").unwrap(), QueryOutcome::DatabaseNotLoaded);
        assert_eq!(engine.info("Azee").unwrap(), QueryOutcome::DatabaseNotLoaded);
        assert_eq!(engine.substitutes("Azee").unwrap(), QueryOutcome::DatabaseNotLoaded);
        assert_eq!(engine.compare_prices("Azee").unwrap(), QueryOutcome::DatabaseNotLoaded);
    }

    #[test]
    fn test_reload_swaps_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drugs.csv");
        std::fs::write(&path, "brand_name,active_ingredient,price\nPan 40,Pantoprazole,150\n").unwrap();

        let engine = empty_engine();
        let before = engine.catalog().unwrap();
        let report = engine.reload(Some(&path)).unwrap();

        assert_eq!(report.rows_kept, 1);
        assert!(before.is_empty());
        assert_eq!(engine.status().unwrap().total_medicines, 1);
        assert!(engine.info("Pan 40").unwrap().is_found());
    }

    #[test]
    fn test_failed_reload_keeps_catalog() {
        let engine = setup_engine();
        let result = engine.reload(Some(Path::new("/definitely/not/here.csv")));
        assert!(matches!(result, Err(MediLensError::CatalogUnavailable(_))));
        assert_eq!(engine.status().unwrap().total_medicines, 5);
    }

    #[test]
    fn test_from_config_without_catalog_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            data_dir: dir.path().to_path_buf(),
            ..EngineConfig::default()
        };
        let engine = MediLens::from_config(config).unwrap();
        assert!(!engine.status().unwrap().loaded);
    }
}
