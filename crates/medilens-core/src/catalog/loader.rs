//! Catalog ingestion from CSV sources.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::schema::{self, CatalogField};
use super::{Catalog, CatalogError, CatalogResult};
use crate::models::{DrugRecord, InteractionField};

/// Catalog file names in order of preference.
pub const CATALOG_FILE_NAMES: &[&str] = &["drugs_master.csv", "drugs_expanded.csv", "drugs.csv"];

/// Counters collected while loading a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Rows dropped because they were flagged discontinued
    pub discontinued: usize,
    /// Rows dropped because the brand name was empty
    pub missing_brand: usize,
    /// Rows whose CSV record could not be read
    pub malformed_rows: usize,
    /// Rows kept with a non-numeric or negative price (treated as unknown)
    pub invalid_prices: usize,
    /// Brand names appearing on more than one kept row
    pub duplicate_brands: usize,
}

/// Find the preferred catalog file in a data directory.
pub fn locate_catalog(data_dir: &Path) -> CatalogResult<PathBuf> {
    CATALOG_FILE_NAMES
        .iter()
        .map(|name| data_dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| CatalogError::NotFound(data_dir.to_path_buf()))
}

/// Reads tabular sources into a [`Catalog`].
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a CSV file.
    pub fn load_path(path: &Path) -> CatalogResult<(Catalog, LoadReport)> {
        let file = std::fs::File::open(path)?;
        Self::load_reader(file, Some(path.to_path_buf()))
    }

    /// Load CSV data from any reader.
    pub fn load_reader<R: Read>(
        reader: R,
        source: Option<PathBuf>,
    ) -> CatalogResult<(Catalog, LoadReport)> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = ColumnMap::from_headers(csv_reader.headers()?);
        for required in schema::REQUIRED_COLUMNS {
            if !columns.contains(required) {
                return Err(CatalogError::MissingColumn((*required).to_string()));
            }
        }

        let mut report = LoadReport::default();
        let mut records = Vec::new();

        for result in csv_reader.records() {
            report.rows_read += 1;
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    tracing::debug!(row = report.rows_read, error = %e, "Skipping unreadable catalog row");
                    report.malformed_rows += 1;
                    continue;
                }
            };

            if columns
                .get(&row, schema::IS_DISCONTINUED)
                .is_some_and(schema::is_truthy_marker)
            {
                report.discontinued += 1;
                continue;
            }

            let Some(brand_name) = columns.text(&row, schema::BRAND_NAME) else {
                report.missing_brand += 1;
                continue;
            };

            let raw_price = columns.get(&row, schema::PRICE).unwrap_or_default();
            let price = parse_price(raw_price);
            if price.is_none() && !raw_price.is_empty() {
                report.invalid_prices += 1;
            }

            records.push(DrugRecord {
                brand_name,
                active_ingredient: columns
                    .text(&row, schema::ACTIVE_INGREDIENT)
                    .unwrap_or_default(),
                generic_name: columns.text(&row, schema::GENERIC_NAME),
                full_composition: columns.text(&row, schema::FULL_COMPOSITION),
                price,
                manufacturer: columns.text(&row, schema::MANUFACTURER),
                pack_size: columns.text(&row, schema::PACK_SIZE),
                use_case: columns.text(&row, schema::USE_CASE),
                side_effects: columns.text(&row, schema::SIDE_EFFECTS),
                precautions: columns.text(&row, schema::PRECAUTIONS),
                interactions: columns
                    .text(&row, schema::INTERACTIONS)
                    .map(InteractionField::from_raw),
                contraindications: columns.text(&row, schema::CONTRAINDICATIONS),
                strength: columns.text(&row, schema::STRENGTH),
                dosage_form: columns.text(&row, schema::DOSAGE_FORM),
                is_otc: columns.get(&row, schema::IS_OTC).and_then(parse_flag),
                schedule: columns.text(&row, schema::SCHEDULE),
                age_group: columns.text(&row, schema::AGE_GROUP),
                hindi_name: columns.text(&row, schema::HINDI_NAME),
            });
        }

        let catalog = Catalog::build(records, columns.searchable_fields(), source);
        report.rows_kept = catalog.len();
        report.duplicate_brands = catalog.duplicate_brand_count();

        if report.malformed_rows > 0 || report.invalid_prices > 0 {
            tracing::warn!(
                malformed_rows = report.malformed_rows,
                invalid_prices = report.invalid_prices,
                "Catalog source has data quality issues"
            );
        }

        Ok((catalog, report))
    }
}

/// Canonical column name → position in the source row.
struct ColumnMap {
    positions: HashMap<String, usize>,
}

impl ColumnMap {
    /// Map headers, letting a canonical header win over a remapped alias.
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut positions = HashMap::new();
        let mapped: Vec<(usize, String, bool)> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let (name, remapped) = schema::canonical_column(h);
                (i, name, remapped)
            })
            .collect();

        for (i, name, remapped) in &mapped {
            if !remapped {
                positions.entry(name.clone()).or_insert(*i);
            }
        }
        for (i, name, remapped) in mapped {
            if remapped {
                positions.entry(name).or_insert(i);
            }
        }

        Self { positions }
    }

    fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    fn get<'r>(&self, row: &'r csv::StringRecord, column: &str) -> Option<&'r str> {
        self.positions.get(column).and_then(|&i| row.get(i))
    }

    /// Non-empty text value of a column.
    fn text(&self, row: &csv::StringRecord, column: &str) -> Option<String> {
        self.get(row, column)
            .map(str::trim)
            .filter(|v| !v.is_empty() && !is_null_marker(v))
            .map(str::to_string)
    }

    fn searchable_fields(&self) -> HashSet<CatalogField> {
        self.positions
            .keys()
            .filter_map(|c| CatalogField::from_column(c))
            .collect()
    }
}

fn is_null_marker(value: &str) -> bool {
    matches!(value, "nan" | "NaN" | "NULL" | "null" | "None" | "N/A")
}

/// Parse a price cell. Accepts a currency prefix and thousands separators;
/// anything non-numeric, non-finite or negative is unknown.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .trim_start_matches("Rs.")
        .trim_start_matches("Rs")
        .trim_start_matches("INR")
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv: &str) -> (Catalog, LoadReport) {
        CatalogLoader::load_reader(csv.as_bytes(), None).unwrap()
    }

    #[test]
    fn test_load_canonical_schema() {
        let (catalog, report) = load(
            "brand_name,active_ingredient,generic_name,price,manufacturer,is_otc\n\
             Crocin,Paracetamol,Paracetamol,25.5,GSK,true\n\
             Azee,Azithromycin,,99,Cipla,false\n",
        );
        assert_eq!(report.rows_read, 2);
        assert_eq!(report.rows_kept, 2);
        let crocin = catalog.lookup_exact("crocin")[0];
        assert_eq!(crocin.price, Some(25.5));
        assert_eq!(crocin.is_otc, Some(true));
        assert_eq!(catalog.lookup_exact("azee")[0].generic_name, None);
    }

    #[test]
    fn test_load_alternate_schema_with_discontinued() {
        let (catalog, report) = load(
            "id,name,price(₹),Is_discontinued,manufacturer_name,type,pack_size_label,short_composition1\n\
             1,Augmentin 625 Duo Tablet,223.42,FALSE,Glaxo SmithKline,allopathy,strip of 10 tablets,Amoxycillin (500mg)\n\
             2,Old Brand,10,TRUE,Someone,allopathy,strip,Nothing\n",
        );
        assert_eq!(report.discontinued, 1);
        assert_eq!(catalog.len(), 1);
        let record = &catalog.records()[0];
        assert_eq!(record.brand_name, "Augmentin 625 Duo Tablet");
        assert_eq!(record.manufacturer.as_deref(), Some("Glaxo SmithKline"));
        assert_eq!(record.active_ingredient, "Amoxycillin (500mg)");
        assert_eq!(record.pack_size.as_deref(), Some("strip of 10 tablets"));
        assert!(!catalog.has_field(CatalogField::GenericName));
    }

    #[test]
    fn test_canonical_header_wins_over_alias() {
        let (catalog, _) = load("name,brand_name,price\nignored,Crocin,10\n");
        assert_eq!(catalog.records()[0].brand_name, "Crocin");
    }

    #[test]
    fn test_missing_required_column() {
        let result = CatalogLoader::load_reader("active_ingredient,price\nX,1\n".as_bytes(), None);
        assert!(matches!(result, Err(CatalogError::MissingColumn(c)) if c == "brand_name"));
    }

    #[test]
    fn test_invalid_prices_become_unknown() {
        let (catalog, report) = load("brand_name,price\nA,abc\nB,-5\nC,\nD,\"1,250.00\"\n");
        assert_eq!(report.invalid_prices, 2);
        let prices: Vec<Option<f64>> = catalog.records().iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![None, None, None, Some(1250.0)]);
    }

    #[test]
    fn test_missing_brand_rows_dropped() {
        let (catalog, report) = load("brand_name,price\n,10\nCrocin,20\n");
        assert_eq!(report.missing_brand, 1);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_ragged_rows_tolerated() {
        let (catalog, _) = load("brand_name,price,manufacturer\nCrocin,20\nAzee,99,Cipla\n");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.records()[0].manufacturer, None);
    }

    #[test]
    fn test_interactions_parsed_at_load() {
        let (catalog, _) = load(
            "brand_name,price,drug_interactions\n\
             Azee,99,\"{\"\"drug\"\": [\"\"Alcohol\"\"], \"\"effect\"\": [\"\"MINOR\"\"]}\"\n",
        );
        let interactions = catalog.records()[0].interactions.clone().unwrap();
        assert_eq!(interactions.parsed, Some(vec!["Alcohol: MINOR".to_string()]));
    }

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price("₹ 45.50"), Some(45.5));
        assert_eq!(parse_price("Rs. 1,200"), Some(1200.0));
        assert_eq!(parse_price("nan"), None);
        assert_eq!(parse_price("inf"), None);
        assert_eq!(parse_price(""), None);
    }
}
