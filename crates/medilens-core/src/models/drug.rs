//! Drug catalog records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single entry in the medicine catalog.
///
/// `brand_name` is the lookup key but is not unique: the same brand can be
/// listed once per manufacturer or pack, and every row stays retrievable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DrugRecord {
    /// Display and lookup name (never empty once loaded)
    pub brand_name: String,
    /// Active ingredient, possibly composite ("A + B")
    pub active_ingredient: String,
    /// Generic name, used as the preferred substitute key
    pub generic_name: Option<String>,
    /// Full salt composition from alternate datasets
    pub full_composition: Option<String>,
    /// Price in the catalog currency; `None` means unknown, never zero
    pub price: Option<f64>,
    pub manufacturer: Option<String>,
    pub pack_size: Option<String>,
    pub use_case: Option<String>,
    pub side_effects: Option<String>,
    pub precautions: Option<String>,
    pub interactions: Option<InteractionField>,
    pub contraindications: Option<String>,
    /// Strength label (e.g., "500MG")
    pub strength: Option<String>,
    /// Dosage form (e.g., "Tablet", "Syrup")
    pub dosage_form: Option<String>,
    /// Over-the-counter flag when the source carries one
    pub is_otc: Option<bool>,
    /// Drug schedule (e.g., "H", "H1", "OTC")
    pub schedule: Option<String>,
    pub age_group: Option<String>,
    pub hindi_name: Option<String>,
}

/// Field used to group interchangeable products.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    GenericName,
    FullComposition,
    ActiveIngredient,
}

/// Identity of a record for substitute grouping.
///
/// Values compare by exact string equality: "Amoxicillin + Clavulanic Acid"
/// and "Amoxicillin" are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub field: IdentityField,
    pub value: String,
}

impl DrugRecord {
    /// Create a new record with the required fields.
    pub fn new(brand_name: impl Into<String>, active_ingredient: impl Into<String>) -> Self {
        Self {
            brand_name: brand_name.into(),
            active_ingredient: active_ingredient.into(),
            ..Self::default()
        }
    }

    /// Builder-style price setter.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Builder-style generic name setter.
    pub fn with_generic_name(mut self, generic_name: impl Into<String>) -> Self {
        self.generic_name = Some(generic_name.into());
        self
    }

    /// Builder-style manufacturer setter.
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Grouping identity: generic name, then full composition, then active
    /// ingredient. Records with none of these cannot be grouped.
    pub fn identity(&self) -> Option<IdentityKey> {
        let candidates = [
            (IdentityField::GenericName, self.generic_name.as_deref()),
            (IdentityField::FullComposition, self.full_composition.as_deref()),
            (IdentityField::ActiveIngredient, Some(self.active_ingredient.as_str())),
        ];
        candidates.into_iter().find_map(|(field, value)| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| IdentityKey {
                    field,
                    value: v.to_string(),
                })
        })
    }

    /// Value of an identity field on this record.
    pub fn identity_value(&self, field: IdentityField) -> Option<&str> {
        match field {
            IdentityField::GenericName => self.generic_name.as_deref(),
            IdentityField::FullComposition => self.full_composition.as_deref(),
            IdentityField::ActiveIngredient => Some(self.active_ingredient.as_str()),
        }
    }

    /// Price if it is a usable, non-negative number.
    pub fn known_price(&self) -> Option<f64> {
        self.price.filter(|p| p.is_finite() && *p >= 0.0)
    }
}

/// Interaction data as stored in the catalog.
///
/// Some datasets embed a JSON payload in the text column. The raw text is
/// always kept; `parsed` holds "partner: effect" lines when the payload is
/// structured and is `None` when it is plain text or malformed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionField {
    pub raw: String,
    pub parsed: Option<Vec<String>>,
}

impl InteractionField {
    /// Wrap raw text, parsing any embedded structured payload.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = parse_interactions(&raw);
        Self { raw, parsed }
    }

    /// Lines suitable for display: parsed entries, else the raw text.
    pub fn display_lines(&self) -> Vec<String> {
        match &self.parsed {
            Some(lines) => lines.clone(),
            None => vec![self.raw.clone()],
        }
    }
}

/// Parse a structured interaction payload.
///
/// Accepts `{"Warfarin": "bleeding risk"}` and the columnar
/// `{"drug": [...], "effect": [...]}` layout.
fn parse_interactions(raw: &str) -> Option<Vec<String>> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('{') {
        return None;
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed interaction payload, keeping raw text");
            return None;
        }
    };
    let map = value.as_object()?;

    if let (Some(Value::Array(drugs)), Some(Value::Array(effects))) =
        (map.get("drug"), map.get("effect"))
    {
        return Some(
            drugs
                .iter()
                .zip(effects.iter())
                .map(|(d, e)| format!("{}: {}", value_text(d), value_text(e)))
                .collect(),
        );
    }

    Some(
        map.iter()
            .map(|(drug, effect)| format!("{}: {}", drug, value_text(effect)))
            .collect(),
    )
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_prefers_generic_name() {
        let record = DrugRecord::new("Crocin", "Paracetamol").with_generic_name("Paracetamol 500mg");
        let key = record.identity().unwrap();
        assert_eq!(key.field, IdentityField::GenericName);
        assert_eq!(key.value, "Paracetamol 500mg");
    }

    #[test]
    fn test_identity_falls_back_to_active_ingredient() {
        let mut record = DrugRecord::new("Drotin", "Drotaverine");
        record.generic_name = Some("   ".into());
        let key = record.identity().unwrap();
        assert_eq!(key.field, IdentityField::ActiveIngredient);
        assert_eq!(key.value, "Drotaverine");
    }

    #[test]
    fn test_identity_uses_full_composition() {
        let mut record = DrugRecord::new("Augmentin 625", "");
        record.full_composition = Some("Amoxycillin (500mg) + Clavulanic Acid (125mg)".into());
        assert_eq!(record.identity().unwrap().field, IdentityField::FullComposition);
    }

    #[test]
    fn test_no_identity_when_all_empty() {
        let record = DrugRecord::new("Mystery", "");
        assert!(record.identity().is_none());
    }

    #[test]
    fn test_known_price_rejects_invalid() {
        assert_eq!(DrugRecord::new("A", "x").with_price(12.5).known_price(), Some(12.5));
        assert_eq!(DrugRecord::new("A", "x").with_price(-1.0).known_price(), None);
        assert_eq!(DrugRecord::new("A", "x").with_price(f64::NAN).known_price(), None);
        assert_eq!(DrugRecord::new("A", "x").known_price(), None);
    }

    #[test]
    fn test_parse_object_interactions() {
        let field = InteractionField::from_raw(r#"{"Warfarin": "Increased bleeding risk"}"#);
        assert_eq!(
            field.parsed,
            Some(vec!["Warfarin: Increased bleeding risk".to_string()])
        );
    }

    #[test]
    fn test_parse_columnar_interactions() {
        let raw = r#"{"drug": ["Alcohol", "Ketoconazole"], "brand": ["-", "Nizral"], "effect": ["MAJOR", "MODERATE"]}"#;
        let field = InteractionField::from_raw(raw);
        assert_eq!(
            field.parsed,
            Some(vec!["Alcohol: MAJOR".to_string(), "Ketoconazole: MODERATE".to_string()])
        );
    }

    #[test]
    fn test_malformed_interactions_stay_raw() {
        let field = InteractionField::from_raw("{not json");
        assert!(field.parsed.is_none());
        assert_eq!(field.display_lines(), vec!["{not json".to_string()]);
    }

    #[test]
    fn test_plain_text_interactions() {
        let field = InteractionField::from_raw("Avoid alcohol.");
        assert!(field.parsed.is_none());
        assert_eq!(field.raw, "Avoid alcohol.");
    }
}
