//! Catalog column schema.
//!
//! Source files come in more than one layout. Headers are folded to lower
//! case, then translated through [`COLUMN_REMAP`] onto the canonical names
//! below before any row is read.

use serde::{Deserialize, Serialize};

pub const BRAND_NAME: &str = "brand_name";
pub const ACTIVE_INGREDIENT: &str = "active_ingredient";
pub const GENERIC_NAME: &str = "generic_name";
pub const FULL_COMPOSITION: &str = "full_composition";
pub const PRICE: &str = "price";
pub const MANUFACTURER: &str = "manufacturer";
pub const PACK_SIZE: &str = "pack_size";
pub const USE_CASE: &str = "use_case";
pub const SIDE_EFFECTS: &str = "side_effects";
pub const PRECAUTIONS: &str = "precautions";
pub const INTERACTIONS: &str = "interactions";
pub const CONTRAINDICATIONS: &str = "contraindications";
pub const STRENGTH: &str = "strength";
pub const DOSAGE_FORM: &str = "dosage_form";
pub const IS_OTC: &str = "is_otc";
pub const SCHEDULE: &str = "schedule";
pub const AGE_GROUP: &str = "age_group";
pub const HINDI_NAME: &str = "hindi_name";
pub const IS_DISCONTINUED: &str = "is_discontinued";

/// Columns a source must provide after remapping.
pub const REQUIRED_COLUMNS: &[&str] = &[BRAND_NAME, PRICE];

/// Alternate header → canonical header.
pub const COLUMN_REMAP: &[(&str, &str)] = &[
    ("name", BRAND_NAME),
    ("product_name", BRAND_NAME),
    ("medicine_name", BRAND_NAME),
    ("manufacturer_name", MANUFACTURER),
    ("product_manufactured", MANUFACTURER),
    ("short_composition1", ACTIVE_INGREDIENT),
    ("salt", ACTIVE_INGREDIENT),
    ("salt_composition", FULL_COMPOSITION),
    ("composition", FULL_COMPOSITION),
    ("price(₹)", PRICE),
    ("product_price", PRICE),
    ("mrp", PRICE),
    ("pack_size_label", PACK_SIZE),
    ("medicine_desc", USE_CASE),
    ("uses", USE_CASE),
    ("side_effect", SIDE_EFFECTS),
    ("drug_interactions", INTERACTIONS),
    ("type", DOSAGE_FORM),
    ("discontinued", IS_DISCONTINUED),
];

/// Values in the discontinued column that mark a row for removal.
const TRUTHY_MARKERS: &[&str] = &["true", "1", "yes", "y"];

/// Canonical name for a raw header, plus whether it came from the remap table.
pub fn canonical_column(header: &str) -> (String, bool) {
    let folded = header.trim().to_lowercase();
    match COLUMN_REMAP.iter().find(|(alias, _)| *alias == folded) {
        Some((_, canonical)) => ((*canonical).to_string(), true),
        None => (folded, false),
    }
}

/// Whether a discontinued-column value marks the row as discontinued.
pub fn is_truthy_marker(value: &str) -> bool {
    let folded = value.trim().to_lowercase();
    TRUTHY_MARKERS.contains(&folded.as_str())
}

/// Searchable text fields of a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CatalogField {
    BrandName,
    ActiveIngredient,
    GenericName,
    FullComposition,
    Manufacturer,
    UseCase,
}

impl CatalogField {
    pub const ALL: [CatalogField; 6] = [
        CatalogField::BrandName,
        CatalogField::ActiveIngredient,
        CatalogField::GenericName,
        CatalogField::FullComposition,
        CatalogField::Manufacturer,
        CatalogField::UseCase,
    ];

    /// Canonical column backing this field.
    pub fn column(&self) -> &'static str {
        match self {
            CatalogField::BrandName => BRAND_NAME,
            CatalogField::ActiveIngredient => ACTIVE_INGREDIENT,
            CatalogField::GenericName => GENERIC_NAME,
            CatalogField::FullComposition => FULL_COMPOSITION,
            CatalogField::Manufacturer => MANUFACTURER,
            CatalogField::UseCase => USE_CASE,
        }
    }

    /// Field for a canonical column name, if it is searchable.
    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_passthrough() {
        assert_eq!(canonical_column("brand_name"), ("brand_name".to_string(), false));
        assert_eq!(canonical_column(" Price "), ("price".to_string(), false));
    }

    #[test]
    fn test_alternate_dataset_headers() {
        assert_eq!(canonical_column("name").0, BRAND_NAME);
        assert_eq!(canonical_column("manufacturer_name").0, MANUFACTURER);
        assert_eq!(canonical_column("price(₹)").0, PRICE);
        assert_eq!(canonical_column("Is_discontinued").0, IS_DISCONTINUED);
        assert_eq!(canonical_column("salt_composition"), (FULL_COMPOSITION.to_string(), true));
    }

    #[test]
    fn test_truthy_markers() {
        assert!(is_truthy_marker("TRUE"));
        assert!(is_truthy_marker(" True "));
        assert!(is_truthy_marker("1"));
        assert!(!is_truthy_marker("FALSE"));
        assert!(!is_truthy_marker(""));
    }

    #[test]
    fn test_field_columns_round_trip() {
        for field in CatalogField::ALL {
            assert_eq!(CatalogField::from_column(field.column()), Some(field));
        }
        assert_eq!(CatalogField::from_column("price"), None);
    }
}
