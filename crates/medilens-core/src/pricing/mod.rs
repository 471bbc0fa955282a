//! Price synthesis over a fixed outlet table.
//!
//! Offers are a pure function of the base price and the table. The only
//! varying output is the generation timestamp.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::default_outlets;
use crate::models::{Outlet, PriceComparison, PriceOffer};

const SEARCH_URL: &str = "https://www.google.com/search?q=";

/// Computes per-outlet offers from a catalog price.
#[derive(Debug, Clone)]
pub struct PriceSynthesizer {
    outlets: Vec<Outlet>,
    currency: String,
}

impl Default for PriceSynthesizer {
    fn default() -> Self {
        Self::new(default_outlets())
    }
}

impl PriceSynthesizer {
    pub fn new(outlets: Vec<Outlet>) -> Self {
        Self {
            outlets,
            currency: "INR".to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn outlets(&self) -> &[Outlet] {
        &self.outlets
    }

    /// One offer per outlet, cheapest first. Equal prices keep table order.
    pub fn offers(&self, medicine: &str, base_price: f64, timestamp: &str) -> Vec<PriceOffer> {
        let mut offers: Vec<PriceOffer> = self
            .outlets
            .iter()
            .map(|outlet| PriceOffer {
                outlet_name: outlet.name.clone(),
                price: round_to(base_price * outlet.multiplier, 2),
                discount_label: outlet.discount_label.clone(),
                delivery_label: outlet.delivery_label.clone(),
                in_stock: true,
                source_url: search_url(medicine, &outlet.name),
                timestamp: timestamp.to_string(),
            })
            .collect();
        offers.sort_by(|a, b| a.price.total_cmp(&b.price));
        offers
    }

    /// Compare outlet prices for a medicine, stamped with the current time.
    pub fn compare(
        &self,
        medicine: &str,
        active_ingredient: &str,
        base_price: f64,
    ) -> Option<PriceComparison> {
        self.compare_at(medicine, active_ingredient, base_price, Utc::now())
    }

    /// Compare outlet prices at a fixed generation time.
    ///
    /// Returns `None` for an empty outlet table or a negative or non-finite
    /// base price.
    pub fn compare_at(
        &self,
        medicine: &str,
        active_ingredient: &str,
        base_price: f64,
        generated_at: DateTime<Utc>,
    ) -> Option<PriceComparison> {
        if !base_price.is_finite() || base_price < 0.0 {
            return None;
        }
        let timestamp = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let offers = self.offers(medicine, base_price, &timestamp);
        let (cheapest_price, best_outlet) = offers
            .first()
            .map(|o| (o.price, o.outlet_name.clone()))?;

        let (savings, savings_percent) = savings(base_price, cheapest_price);
        Some(PriceComparison {
            medicine: medicine.to_string(),
            active_ingredient: active_ingredient.to_string(),
            base_price,
            cheapest_price,
            best_outlet,
            savings,
            savings_percent,
            currency: self.currency.clone(),
            generated_at: timestamp,
            offers,
        })
    }
}

/// Absolute (2 dp) and percentage (1 dp) savings of `cheapest` against `base`.
pub fn savings(base: f64, cheapest: f64) -> (f64, f64) {
    let absolute = round_to(base - cheapest, 2);
    let percent = if base == 0.0 {
        0.0
    } else {
        round_to((base - cheapest) / base * 100.0, 1)
    };
    (absolute, percent)
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Web search link for "<medicine> price <outlet>".
pub fn search_url(medicine: &str, outlet: &str) -> String {
    let query = format!("{} price {}", medicine.trim(), outlet.trim());
    let encoded: Vec<&str> = query.split_whitespace().collect();
    format!("{}{}", SEARCH_URL, encoded.join("+"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn two_outlets() -> PriceSynthesizer {
        PriceSynthesizer::new(vec![
            Outlet::new("X", 0.95, "5% off", "2-3 days"),
            Outlet::new("Y", 0.92, "8% off", "1-2 days"),
        ])
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_compare_two_outlets() {
        let comparison = two_outlets()
            .compare_at("Drotin", "Drotaverine", 100.0, fixed_time())
            .unwrap();

        let offers: Vec<(&str, f64)> = comparison
            .offers
            .iter()
            .map(|o| (o.outlet_name.as_str(), o.price))
            .collect();
        assert_eq!(offers, vec![("Y", 92.0), ("X", 95.0)]);
        assert_eq!(comparison.best_outlet, "Y");
        assert_eq!(comparison.cheapest_price, 92.0);
        assert_eq!(comparison.savings, 8.0);
        assert_eq!(comparison.savings_percent, 8.0);
        assert_eq!(comparison.currency, "INR");
        assert_eq!(comparison.generated_at, "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_zero_base_price() {
        let comparison = two_outlets()
            .compare_at("Free", "Nothing", 0.0, fixed_time())
            .unwrap();
        assert_eq!(comparison.savings_percent, 0.0);
        assert_eq!(comparison.savings, 0.0);
        assert!(comparison.offers.iter().all(|o| o.price == 0.0));
    }

    #[test]
    fn test_invalid_base_price_rejected() {
        let synth = two_outlets();
        assert!(synth.compare_at("A", "B", -1.0, fixed_time()).is_none());
        assert!(synth.compare_at("A", "B", f64::NAN, fixed_time()).is_none());
    }

    #[test]
    fn test_empty_outlet_table() {
        let synth = PriceSynthesizer::new(Vec::new());
        assert!(synth.compare_at("A", "B", 10.0, fixed_time()).is_none());
    }

    #[test]
    fn test_default_table_ordering() {
        let comparison = PriceSynthesizer::default()
            .compare_at("Pan 40", "Pantoprazole", 150.0, fixed_time())
            .unwrap();
        let names: Vec<&str> = comparison
            .offers
            .iter()
            .map(|o| o.outlet_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["PharmEasy", "1mg", "Netmeds", "MedPlus", "Local Pharmacy", "Apollo Pharmacy"]
        );
        assert_eq!(comparison.offers[0].price, 138.0);
        assert!(comparison.offers.iter().all(|o| o.in_stock));
    }

    #[test]
    fn test_ties_keep_table_order() {
        let synth = PriceSynthesizer::new(vec![
            Outlet::new("First", 1.0, "", ""),
            Outlet::new("Second", 1.0, "", ""),
        ]);
        let offers = synth.offers("A", 10.0, "t");
        assert_eq!(offers[0].outlet_name, "First");
        assert_eq!(offers[1].outlet_name, "Second");
    }

    #[test]
    fn test_search_url() {
        assert_eq!(
            search_url("Dolo 650", "Apollo Pharmacy"),
            "https://www.google.com/search?q=Dolo+650+price+Apollo+Pharmacy"
        );
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(92.004, 2), 92.0);
        assert_eq!(round_to(8.04, 1), 8.0);
    }

    proptest! {
        #[test]
        fn prop_compare_is_pure(base in 0.0f64..100_000.0) {
            let synth = PriceSynthesizer::default();
            let a = synth.compare_at("A", "B", base, fixed_time()).unwrap();
            let b = synth.compare_at("A", "B", base, fixed_time()).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_offers_ascending(base in 0.0f64..100_000.0) {
            let offers = PriceSynthesizer::default().offers("A", base, "t");
            prop_assert!(offers.windows(2).all(|w| w[0].price <= w[1].price));
        }

        #[test]
        fn prop_savings_percent(base in 0.01f64..100_000.0) {
            let comparison = PriceSynthesizer::default()
                .compare_at("A", "B", base, fixed_time())
                .unwrap();
            let expected = round_to((base - comparison.cheapest_price) / base * 100.0, 1);
            prop_assert_eq!(comparison.savings_percent, expected);
        }
    }
}
