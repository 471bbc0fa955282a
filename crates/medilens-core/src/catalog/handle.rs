//! Shared, swappable catalog reference.

use std::sync::{Arc, RwLock};

use super::{Catalog, CatalogError, CatalogResult};

/// Holds the current catalog behind an `Arc`.
///
/// Readers clone the `Arc` once per request and keep using that snapshot
/// even if a reload swaps in a new catalog meanwhile.
#[derive(Debug)]
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// The catalog as of now.
    pub fn snapshot(&self) -> CatalogResult<Arc<Catalog>> {
        let guard = self.current.read().map_err(|_| CatalogError::LockPoisoned)?;
        Ok(Arc::clone(&*guard))
    }

    /// Replace the catalog, returning the previous one.
    pub fn swap(&self, catalog: Catalog) -> CatalogResult<Arc<Catalog>> {
        let next = Arc::new(catalog);
        let mut guard = self.current.write().map_err(|_| CatalogError::LockPoisoned)?;
        Ok(std::mem::replace(&mut *guard, next))
    }
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::new(Catalog::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrugRecord;

    #[test]
    fn test_snapshot_survives_swap() {
        let handle = CatalogHandle::new(Catalog::from_records(vec![DrugRecord::new(
            "Crocin",
            "Paracetamol",
        )]));
        let before = handle.snapshot().unwrap();

        let previous = handle.swap(Catalog::empty()).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(previous.len(), 1);
        assert!(handle.snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_readers() {
        let handle = Arc::new(CatalogHandle::new(Catalog::from_records(vec![
            DrugRecord::new("Azee", "Azithromycin"),
        ])));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                std::thread::spawn(move || handle.snapshot().unwrap().lookup_exact("azee").len())
            })
            .collect();

        for reader in readers {
            assert_eq!(reader.join().unwrap(), 1);
        }
    }
}
