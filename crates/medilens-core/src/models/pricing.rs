//! Price comparison models.

use serde::{Deserialize, Serialize};

/// A named seller with a fixed price multiplier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outlet {
    pub name: String,
    /// Applied to the catalog price (e.g., 0.95 for 5% below)
    pub multiplier: f64,
    pub discount_label: String,
    pub delivery_label: String,
}

impl Outlet {
    pub fn new(name: &str, multiplier: f64, discount_label: &str, delivery_label: &str) -> Self {
        Self {
            name: name.to_string(),
            multiplier,
            discount_label: discount_label.to_string(),
            delivery_label: delivery_label.to_string(),
        }
    }
}

/// One outlet's computed price for a medicine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceOffer {
    pub outlet_name: String,
    /// Rounded to 2 decimal places
    pub price: f64,
    pub discount_label: String,
    pub delivery_label: String,
    pub in_stock: bool,
    pub source_url: String,
    /// RFC 3339 generation time
    pub timestamp: String,
}

/// Ranked offers plus the best deal relative to the catalog price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceComparison {
    pub medicine: String,
    pub active_ingredient: String,
    pub base_price: f64,
    pub cheapest_price: f64,
    pub best_outlet: String,
    /// `base_price - cheapest_price`, 2 decimal places
    pub savings: f64,
    /// Savings as a percentage of `base_price`, 1 decimal place
    pub savings_percent: f64,
    /// Sorted ascending by price
    pub offers: Vec<PriceOffer>,
    pub currency: String,
    pub generated_at: String,
}
