//! Country to ISO alpha-3 lookup
//!
//! The map view joins aggregated rows to geographic regions by ISO code.
//! The built-in table covers the African countries present in the Gapminder
//! country list. South Sudan and Seychelles are missing from that list and
//! are added by hand. An optional `country,iso_alpha` CSV extends or
//! overrides the table.

use std::collections::HashMap;
use std::path::Path;

use super::error::{DatasetError, DatasetResult};

const BUILTIN: &[(&str, &str)] = &[
    ("Algeria", "DZA"),
    ("Angola", "AGO"),
    ("Benin", "BEN"),
    ("Botswana", "BWA"),
    ("Burkina Faso", "BFA"),
    ("Burundi", "BDI"),
    ("Cameroon", "CMR"),
    ("Cape Verde", "CPV"),
    ("Central African Republic", "CAF"),
    ("Chad", "TCD"),
    ("Comoros", "COM"),
    ("Congo, Dem. Rep.", "COD"),
    // Spelling used by the cleaned export
    ("Congo, Dem, Rep.", "COD"),
    ("Congo, Rep.", "COG"),
    ("Cote d'Ivoire", "CIV"),
    ("Djibouti", "DJI"),
    ("Egypt", "EGY"),
    ("Equatorial Guinea", "GNQ"),
    ("Eritrea", "ERI"),
    ("Eswatini", "SWZ"),
    ("Ethiopia", "ETH"),
    ("Gabon", "GAB"),
    ("Gambia", "GMB"),
    ("Ghana", "GHA"),
    ("Guinea", "GIN"),
    ("Guinea-Bissau", "GNB"),
    ("Kenya", "KEN"),
    ("Lesotho", "LSO"),
    ("Liberia", "LBR"),
    ("Libya", "LBY"),
    ("Madagascar", "MDG"),
    ("Malawi", "MWI"),
    ("Mali", "MLI"),
    ("Mauritania", "MRT"),
    ("Mauritius", "MUS"),
    ("Morocco", "MAR"),
    ("Mozambique", "MOZ"),
    ("Namibia", "NAM"),
    ("Niger", "NER"),
    ("Nigeria", "NGA"),
    ("Reunion", "REU"),
    ("Rwanda", "RWA"),
    ("Sao Tome and Principe", "STP"),
    ("Senegal", "SEN"),
    ("Sierra Leone", "SLE"),
    ("Somalia", "SOM"),
    ("South Africa", "ZAF"),
    ("Sudan", "SDN"),
    ("Swaziland", "SWZ"),
    ("Tanzania", "TZA"),
    ("Togo", "TGO"),
    ("Tunisia", "TUN"),
    ("Uganda", "UGA"),
    ("Zambia", "ZMB"),
    ("Zimbabwe", "ZWE"),
];

const MANUAL: &[(&str, &str)] = &[("South Sudan", "SSD"), ("Seychelles", "SYC")];

/// Country name to ISO alpha-3 code
#[derive(Debug, Clone)]
pub struct IsoLookup {
    codes: HashMap<String, String>,
}

impl Default for IsoLookup {
    fn default() -> Self {
        Self::builtin()
    }
}

impl IsoLookup {
    /// Built-in table plus the manual entries
    pub fn builtin() -> Self {
        let codes = BUILTIN
            .iter()
            .chain(MANUAL.iter())
            .map(|(country, iso)| (country.to_string(), iso.to_string()))
            .collect();
        Self { codes }
    }

    /// An empty table (every lookup misses)
    pub fn empty() -> Self {
        Self {
            codes: HashMap::new(),
        }
    }

    /// Add or replace one entry
    pub fn insert(&mut self, country: impl Into<String>, iso_alpha: impl Into<String>) {
        self.codes.insert(country.into(), iso_alpha.into());
    }

    /// Look up a country's code
    pub fn get(&self, country: &str) -> Option<&str> {
        self.codes.get(country).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Merge entries from a `country,iso_alpha` CSV with a header row
    pub fn extend_from_csv(&mut self, path: &Path) -> DatasetResult<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| DatasetError::IsoTable {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        let mut added = 0;
        for (line_num, result) in reader.records().enumerate() {
            let record = result.map_err(|e| DatasetError::IsoTable {
                path: path.to_path_buf(),
                error: format!("line {}: {}", line_num + 2, e),
            })?;

            let (Some(country), Some(iso)) = (record.get(0), record.get(1)) else {
                tracing::warn!(line = line_num + 2, "Skipping short ISO table row");
                continue;
            };
            let (country, iso) = (country.trim(), iso.trim());
            if country.is_empty() || iso.len() != 3 {
                tracing::warn!(line = line_num + 2, country, iso, "Skipping invalid ISO table row");
                continue;
            }

            self.insert(country, iso.to_uppercase());
            added += 1;
        }

        tracing::debug!(path = ?path, added, "Loaded ISO overrides");
        Ok(added)
    }
}
