//! Medicine resolver.
//!
//! Pipeline: OCR text → Tokenizer → Tiered catalog lookup → Substitutes / Prices
//!
//! Tiers run in order per token and stop at the first one that matches:
//! 1. exact brand name
//! 2. brand name prefix
//! 3. brand name substring, together with
//! 4. ingredient substring (both only for tokens of `min_substring_len`+ chars)

mod substitutes;
mod suggest;
mod tokenizer;

pub use substitutes::*;
pub use suggest::*;
pub use tokenizer::*;

use std::collections::HashSet;

use crate::catalog::{Catalog, CatalogField};
use crate::config::TierLimits;
use crate::models::{Detection, DrugRecord, MatchTier, TokenMatch};

/// Resolves candidate tokens to catalog brand names.
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    limits: TierLimits,
}

impl<'a> Resolver<'a> {
    /// Create a resolver with default tier limits.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_limits(catalog, TierLimits::default())
    }

    pub fn with_limits(catalog: &'a Catalog, limits: TierLimits) -> Self {
        Self { catalog, limits }
    }

    pub fn limits(&self) -> &TierLimits {
        &self.limits
    }

    /// Run the tier policy for one token.
    pub fn match_token(&self, token: &str) -> TokenMatch {
        let mut result = TokenMatch {
            token: token.to_string(),
            tiers: Vec::new(),
            brands: Vec::new(),
        };

        let exact = self.catalog.lookup_exact(token);
        if !exact.is_empty() {
            add_hits(&mut result, MatchTier::Exact, exact, self.limits.exact_cap);
            return result;
        }

        let prefix = self.catalog.lookup_prefix(token);
        if !prefix.is_empty() {
            add_hits(&mut result, MatchTier::Prefix, prefix, self.limits.prefix_cap);
            return result;
        }

        if token.chars().count() < self.limits.min_substring_len {
            return result;
        }

        let brand_hits = self.catalog.lookup_contains(CatalogField::BrandName, token);
        add_hits(
            &mut result,
            MatchTier::BrandSubstring,
            brand_hits,
            self.limits.substring_cap,
        );

        let ingredient_hits = self.ingredient_hits(token);
        add_hits(
            &mut result,
            MatchTier::IngredientSubstring,
            ingredient_hits,
            self.limits.ingredient_cap,
        );

        result
    }

    /// Records whose active ingredient, then generic name, contains `token`.
    fn ingredient_hits(&self, token: &str) -> Vec<&'a DrugRecord> {
        let mut hits = self
            .catalog
            .lookup_contains(CatalogField::ActiveIngredient, token);
        if hits.len() < self.limits.ingredient_cap {
            for record in self.catalog.lookup_contains(CatalogField::GenericName, token) {
                if !hits.iter().any(|h| std::ptr::eq(*h, record)) {
                    hits.push(record);
                }
            }
        }
        hits
    }

    /// Per-token matches, in token order.
    pub fn resolve_detailed(&self, tokens: &[String]) -> Vec<TokenMatch> {
        tokens
            .iter()
            .map(|token| {
                let matched = self.match_token(token);
                tracing::debug!(
                    token = %matched.token,
                    tiers = ?matched.tiers,
                    hits = matched.brands.len(),
                    "Resolved token"
                );
                matched
            })
            .collect()
    }

    /// Distinct matched brand names in first-seen order, capped at
    /// `max_results`.
    pub fn resolve(&self, tokens: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for token in tokens {
            if resolved.len() >= self.limits.max_results {
                break;
            }
            for brand in self.match_token(token).brands {
                if resolved.len() >= self.limits.max_results {
                    break;
                }
                if seen.insert(brand.clone()) {
                    resolved.push(brand);
                }
            }
        }

        resolved
    }

    /// Tokenize and resolve a block of OCR text.
    pub fn detect(&self, raw_text: &str) -> Detection {
        let tokens = tokenize(raw_text);
        let detected_medicines = self.resolve(&tokens);
        tracing::info!(
            tokens = tokens.len(),
            detected = detected_medicines.len(),
            "Detected medicines in text"
        );
        Detection {
            cleaned_text: clean_text(raw_text),
            count: detected_medicines.len(),
            detected_medicines,
            tokens,
        }
    }
}

/// Record a tier's hits (up to `cap`) on the token match.
fn add_hits(result: &mut TokenMatch, tier: MatchTier, hits: Vec<&DrugRecord>, cap: usize) {
    if hits.is_empty() {
        return;
    }
    result.tiers.push(tier);
    for record in hits.into_iter().take(cap) {
        if !result.brands.contains(&record.brand_name) {
            result.brands.push(record.brand_name.clone());
        }
    }
}
