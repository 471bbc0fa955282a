//! "Did you mean" suggestions for brand names that were not found.

use std::cmp::Ordering;

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::catalog::Catalog;

/// Minimum similarity for a brand to be suggested.
const MIN_SIMILARITY: f64 = 0.75;

/// Closest brand names to `query`, best first.
pub fn suggest_brands(catalog: &Catalog, query: &str, limit: usize) -> Vec<String> {
    let query = query.trim().to_lowercase();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &str)> = catalog
        .distinct_brands()
        .map(|(folded, display)| (fuzzy_match(&query, folded), display))
        .filter(|(score, _)| *score >= MIN_SIMILARITY)
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(b.1))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Compute fuzzy string similarity using combined metrics.
pub fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler rewards shared prefixes, which suits truncated OCR reads
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);
    jw * 0.6 + lev * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrugRecord;

    #[test]
    fn test_fuzzy_match() {
        assert!(fuzzy_match("azithral", "azithral") > 0.99);
        assert!(fuzzy_match("azithral", "azitral") > 0.85);
        assert!(fuzzy_match("azithral", "pantocid") < 0.5);
    }

    #[test]
    fn test_suggests_close_brands() {
        let catalog = Catalog::from_records(vec![
            DrugRecord::new("Azithral", "Azithromycin"),
            DrugRecord::new("Azee", "Azithromycin"),
            DrugRecord::new("Pantocid", "Pantoprazole"),
        ]);

        let suggestions = suggest_brands(&catalog, "Azithrall", 5);
        assert_eq!(suggestions.first().map(String::as_str), Some("Azithral"));
        assert!(!suggestions.contains(&"Pantocid".to_string()));
    }

    #[test]
    fn test_no_suggestions_for_noise() {
        let catalog = Catalog::from_records(vec![DrugRecord::new("Pantocid", "Pantoprazole")]);
        assert!(suggest_brands(&catalog, "xq", 5).is_empty());
        assert!(suggest_brands(&catalog, "", 5).is_empty());
    }
}
