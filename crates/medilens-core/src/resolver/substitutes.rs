//! Substitute grouping by active-ingredient identity.

use crate::catalog::Catalog;
use crate::models::{DrugRecord, GenericAlternative};

/// Default number of substitutes returned per record.
pub const DEFAULT_SUBSTITUTES_LIMIT: usize = 10;

/// Finds interchangeable products for a record.
pub struct SubstituteGrouper<'a> {
    catalog: &'a Catalog,
    limit: usize,
}

impl<'a> SubstituteGrouper<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_limit(catalog, DEFAULT_SUBSTITUTES_LIMIT)
    }

    pub fn with_limit(catalog: &'a Catalog, limit: usize) -> Self {
        Self { catalog, limit }
    }

    /// Other records with the same identity, cheapest first, unknown prices last.
    ///
    /// Rows sharing the record's brand name are excluded along with the
    /// record itself.
    pub fn substitutes(&self, record: &DrugRecord) -> Vec<&'a DrugRecord> {
        let Some(key) = record.identity() else {
            return Vec::new();
        };
        self.catalog
            .group_by_identity(&key, &record.brand_name)
            .into_iter()
            .take(self.limit)
            .collect()
    }

    /// Substitutes in their display form.
    pub fn alternatives(&self, record: &DrugRecord) -> Vec<GenericAlternative> {
        self.substitutes(record)
            .into_iter()
            .map(GenericAlternative::from)
            .collect()
    }
}
