//! In-memory medicine catalog.
//!
//! Built once from a tabular source and never mutated afterwards. Lookups
//! take `&self`, so any number of requests can read one catalog at a time.
//! Replacing the data means building a new [`Catalog`] and swapping it in
//! through a [`CatalogHandle`].

mod handle;
mod loader;
mod schema;

pub use handle::*;
pub use loader::*;
pub use schema::*;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DrugRecord, IdentityField, IdentityKey};

/// Catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("No catalog file found in {0}")]
    NotFound(PathBuf),

    #[error("Catalog lock poisoned")]
    LockPoisoned,
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Summary of the loaded catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogStatus {
    pub loaded: bool,
    pub total_medicines: usize,
    pub source: Option<String>,
}

/// Lower-cased copies of the indexed text fields.
#[derive(Debug, Clone)]
struct FoldedFields {
    brand: String,
    active: String,
    generic: String,
    composition: String,
}

/// Indexed, read-only collection of drug records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<DrugRecord>,
    folded: Vec<FoldedFields>,
    /// Lower-cased brand name → row indices, ordered for prefix scans
    brand_index: BTreeMap<String, Vec<usize>>,
    /// Exact identity value → row indices
    identity_index: HashMap<IdentityKey, Vec<usize>>,
    /// Searchable fields present in the source schema
    columns: HashSet<CatalogField>,
    source: Option<PathBuf>,
}

impl Catalog {
    /// A valid catalog with no records. Every lookup on it returns nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from records, treating every searchable field as present.
    pub fn from_records(records: Vec<DrugRecord>) -> Self {
        Self::build(records, CatalogField::ALL.into_iter().collect(), None)
    }

    /// Load a catalog file, degrading to an empty catalog on any failure.
    pub fn load(path: &Path) -> Self {
        match CatalogLoader::load_path(path) {
            Ok((catalog, report)) => {
                tracing::info!(
                    path = %path.display(),
                    rows_read = report.rows_read,
                    rows_kept = report.rows_kept,
                    discontinued = report.discontinued,
                    invalid_prices = report.invalid_prices,
                    "Loaded medicine catalog"
                );
                catalog
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Catalog unavailable, serving empty catalog");
                Self::empty()
            }
        }
    }

    pub(crate) fn build(
        records: Vec<DrugRecord>,
        columns: HashSet<CatalogField>,
        source: Option<PathBuf>,
    ) -> Self {
        let records: Vec<DrugRecord> = records
            .into_iter()
            .filter(|r| !r.brand_name.trim().is_empty())
            .collect();

        let mut brand_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut identity_index: HashMap<IdentityKey, Vec<usize>> = HashMap::new();
        let mut folded = Vec::with_capacity(records.len());

        for (idx, record) in records.iter().enumerate() {
            let entry = FoldedFields {
                brand: record.brand_name.to_lowercase(),
                active: record.active_ingredient.to_lowercase(),
                generic: record.generic_name.as_deref().unwrap_or_default().to_lowercase(),
                composition: record
                    .full_composition
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase(),
            };
            brand_index.entry(entry.brand.clone()).or_default().push(idx);
            folded.push(entry);

            for field in [
                IdentityField::GenericName,
                IdentityField::FullComposition,
                IdentityField::ActiveIngredient,
            ] {
                if let Some(value) = record.identity_value(field).filter(|v| !v.trim().is_empty()) {
                    identity_index
                        .entry(IdentityKey {
                            field,
                            value: value.to_string(),
                        })
                        .or_default()
                        .push(idx);
                }
            }
        }

        Self {
            records,
            folded,
            brand_index,
            identity_index,
            columns,
            source,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in source order.
    pub fn records(&self) -> &[DrugRecord] {
        &self.records
    }

    pub fn status(&self) -> CatalogStatus {
        CatalogStatus {
            loaded: !self.is_empty(),
            total_medicines: self.len(),
            source: self.source.as_ref().map(|p| p.display().to_string()),
        }
    }

    /// Whether a searchable field was present in the source schema.
    pub fn has_field(&self, field: CatalogField) -> bool {
        self.columns.contains(&field)
    }

    /// Number of brand names that appear on more than one row.
    pub fn duplicate_brand_count(&self) -> usize {
        self.brand_index.values().filter(|rows| rows.len() > 1).count()
    }

    /// Each distinct brand as (lower-cased key, display name of its first row).
    pub fn distinct_brands(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.brand_index.iter().filter_map(|(folded, rows)| {
            rows.first()
                .map(|&i| (folded.as_str(), self.records[i].brand_name.as_str()))
        })
    }

    /// Records whose brand name equals `name`, ignoring case.
    pub fn lookup_exact(&self, name: &str) -> Vec<&DrugRecord> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return Vec::new();
        }
        self.brand_index
            .get(&key)
            .map(|rows| rows.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Records whose brand name starts with `prefix`, ignoring case.
    pub fn lookup_prefix(&self, prefix: &str) -> Vec<&DrugRecord> {
        let key = prefix.trim().to_lowercase();
        if key.is_empty() {
            return Vec::new();
        }
        let mut rows: Vec<usize> = self
            .brand_index
            .range(key.clone()..)
            .take_while(|(brand, _)| brand.starts_with(&key))
            .flat_map(|(_, rows)| rows.iter().copied())
            .collect();
        rows.sort_unstable();
        rows.into_iter().map(|i| &self.records[i]).collect()
    }

    /// Records whose `field` contains `substring`, ignoring case.
    ///
    /// A field the source schema did not provide yields nothing.
    pub fn lookup_contains(&self, field: CatalogField, substring: &str) -> Vec<&DrugRecord> {
        let needle = substring.trim().to_lowercase();
        if needle.is_empty() || !self.has_field(field) {
            return Vec::new();
        }
        self.records
            .iter()
            .zip(self.folded.iter())
            .filter(|(record, folded)| match field {
                CatalogField::BrandName => folded.brand.contains(&needle),
                CatalogField::ActiveIngredient => folded.active.contains(&needle),
                CatalogField::GenericName => folded.generic.contains(&needle),
                CatalogField::FullComposition => folded.composition.contains(&needle),
                CatalogField::Manufacturer => contains_folded(record.manufacturer.as_deref(), &needle),
                CatalogField::UseCase => contains_folded(record.use_case.as_deref(), &needle),
            })
            .map(|(record, _)| record)
            .collect()
    }

    /// Records sharing `key` exactly, minus `exclude_brand`, cheapest first.
    ///
    /// Records without a usable price sort after all priced records; ties keep
    /// source order.
    pub fn group_by_identity(&self, key: &IdentityKey, exclude_brand: &str) -> Vec<&DrugRecord> {
        let mut group: Vec<&DrugRecord> = self
            .identity_index
            .get(key)
            .map(|rows| {
                rows.iter()
                    .map(|&i| &self.records[i])
                    .filter(|r| r.brand_name != exclude_brand)
                    .collect()
            })
            .unwrap_or_default();
        group.sort_by(|a, b| price_order(a.known_price(), b.known_price()));
        group
    }
}

fn contains_folded(value: Option<&str>, needle: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains(needle))
}

/// Ascending price order with unknown prices last.
pub(crate) fn price_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
