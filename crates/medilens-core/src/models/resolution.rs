//! Request-scoped results built by the resolver and the facade.

use serde::{Deserialize, Serialize};

use super::{DrugRecord, InteractionField};

/// Matching strategy that produced a hit for a token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Case-insensitive brand name equality
    Exact,
    /// Brand name starts with the token
    Prefix,
    /// Brand name contains the token
    BrandSubstring,
    /// Active ingredient or generic name contains the token
    IngredientSubstring,
}

/// Outcome of resolving one token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenMatch {
    pub token: String,
    /// Tiers that contributed, in the order they ran
    pub tiers: Vec<MatchTier>,
    /// Matched brand names for this token, in catalog order
    pub brands: Vec<String>,
}

/// A cheaper (or equal) product sharing the same identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenericAlternative {
    pub brand_name: String,
    pub price: Option<f64>,
    pub manufacturer: Option<String>,
    pub is_otc: Option<bool>,
    pub schedule: Option<String>,
}

impl From<&DrugRecord> for GenericAlternative {
    fn from(record: &DrugRecord) -> Self {
        Self {
            brand_name: record.brand_name.clone(),
            price: record.known_price(),
            manufacturer: record.manufacturer.clone(),
            is_otc: record.is_otc,
            schedule: record.schedule.clone(),
        }
    }
}

/// Detail view of one catalog record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugInfo {
    pub brand_name: String,
    pub active_ingredient: String,
    pub generic_name: Option<String>,
    pub use_case: Option<String>,
    pub side_effects: Option<String>,
    pub precautions: String,
    pub price: Option<f64>,
    pub manufacturer: Option<String>,
    pub pack_size: Option<String>,
    pub strength: Option<String>,
    pub dosage_form: Option<String>,
    pub is_otc: Option<bool>,
    pub schedule: Option<String>,
    pub age_group: Option<String>,
    pub interactions: Option<InteractionField>,
    pub contraindications: Option<String>,
    pub hindi_name: Option<String>,
}

/// Shown when a record carries no precautions of its own.
pub const DEFAULT_PRECAUTIONS: &str = "Consult your doctor";

impl From<&DrugRecord> for DrugInfo {
    fn from(record: &DrugRecord) -> Self {
        Self {
            brand_name: record.brand_name.clone(),
            active_ingredient: record.active_ingredient.clone(),
            generic_name: record.generic_name.clone(),
            use_case: record.use_case.clone(),
            side_effects: record.side_effects.clone(),
            precautions: record
                .precautions
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PRECAUTIONS.to_string()),
            price: record.known_price(),
            manufacturer: record.manufacturer.clone(),
            pack_size: record.pack_size.clone(),
            strength: record.strength.clone(),
            dosage_form: record.dosage_form.clone(),
            is_otc: record.is_otc,
            schedule: record.schedule.clone(),
            age_group: record.age_group.clone(),
            interactions: record.interactions.clone(),
            contraindications: record.contraindications.clone(),
            hindi_name: record.hindi_name.clone(),
        }
    }
}

/// A resolved record together with its substitutes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedMatch {
    #[serde(flatten)]
    pub drug: DrugInfo,
    /// Substitutes sorted by price, unknown prices last
    pub generics: Vec<GenericAlternative>,
}

/// Medicines detected in a block of OCR text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub cleaned_text: String,
    pub tokens: Vec<String>,
    pub detected_medicines: Vec<String>,
    pub count: usize,
}

/// Result of a request operation.
///
/// Missing data is an ordinary outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum QueryOutcome<T> {
    Found(T),
    NotFound {
        query: String,
        message: String,
        suggestions: Vec<String>,
    },
    /// The catalog holds no records
    DatabaseNotLoaded,
}

impl<T> QueryOutcome<T> {
    pub fn not_found(query: impl Into<String>, message: impl Into<String>) -> Self {
        QueryOutcome::NotFound {
            query: query.into(),
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, QueryOutcome::Found(_))
    }

    /// The found value, if any.
    pub fn found(self) -> Option<T> {
        match self {
            QueryOutcome::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryOutcome<U> {
        match self {
            QueryOutcome::Found(value) => QueryOutcome::Found(f(value)),
            QueryOutcome::NotFound {
                query,
                message,
                suggestions,
            } => QueryOutcome::NotFound {
                query,
                message,
                suggestions,
            },
            QueryOutcome::DatabaseNotLoaded => QueryOutcome::DatabaseNotLoaded,
        }
    }
}
