//! CSV Loader
//!
//! Reads the cleaned wide-format export (one row per country and year, one
//! column per disease) and melts it into one `DeathRecord` per
//! (country, year, disease). Per-capita rates and ISO codes are joined in
//! while melting so the store only ever holds a single table.

use std::collections::HashMap;
use std::io::Read;
use std::ops::RangeInclusive;
use std::path::Path;

use super::error::{DatasetError, DatasetResult};
use super::iso::IsoLookup;
use super::types::{DeathRecord, Disease};

const COUNTRY_COLUMN: &str = "country";
const YEAR_COLUMN: &str = "year";
const SUB_REGION_COLUMN: &str = "sub_region";
const POPULATION_COLUMN: &str = "number_of_under_five_years_children";

/// Four-digit calendar years; anything else is a bad cell
const YEAR_RANGE: RangeInclusive<i32> = 1000..=9999;

/// Maximum number of row errors kept in a report
const MAX_REPORTED_ERRORS: usize = 100;

/// Loader for the cleaned mortality CSV
pub struct DatasetLoader {
    iso: IsoLookup,
    has_header: bool,
}

/// Outcome of a load
#[derive(Debug)]
pub struct LoadReport {
    pub records: Vec<DeathRecord>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Column positions resolved from the header row
struct ColumnMap {
    country: usize,
    year: usize,
    sub_region: Option<usize>,
    population: Option<usize>,
    diseases: Vec<(Disease, usize)>,
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord, source_name: &str) -> DatasetResult<Self> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.trim().to_lowercase(), idx))
            .collect();

        let require = |column: &str| {
            positions
                .get(column)
                .copied()
                .ok_or_else(|| DatasetError::MissingColumn {
                    column: column.to_string(),
                    source_name: source_name.to_string(),
                })
        };

        let country = require(COUNTRY_COLUMN)?;
        let year = require(YEAR_COLUMN)?;
        let diseases = Disease::all()
            .iter()
            .map(|d| require(d.source_column()).map(|idx| (*d, idx)))
            .collect::<DatasetResult<Vec<_>>>()?;

        let sub_region = positions.get(SUB_REGION_COLUMN).copied();
        let population = positions.get(POPULATION_COLUMN).copied();
        if population.is_none() {
            tracing::warn!(
                source = source_name,
                "No under-five population column, per-capita rates will be unavailable"
            );
        }

        Ok(Self {
            country,
            year,
            sub_region,
            population,
            diseases,
        })
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    /// Create a loader that joins ISO codes from the built-in table
    pub fn new() -> Self {
        Self {
            iso: IsoLookup::builtin(),
            has_header: true,
        }
    }

    /// Use a specific ISO lookup
    pub fn with_iso(mut self, iso: IsoLookup) -> Self {
        self.iso = iso;
        self
    }

    /// Set whether the CSV has a header row
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// The ISO lookup this loader joins with
    pub fn iso(&self) -> &IsoLookup {
        &self.iso
    }

    /// Load from a file
    pub fn load(&self, path: &Path) -> DatasetResult<LoadReport> {
        let file = std::fs::File::open(path)?;
        self.read(file, &path.display().to_string())
    }

    /// Load from an in-memory string (useful for testing)
    pub fn load_str(&self, csv_data: &str) -> DatasetResult<LoadReport> {
        self.read(csv_data.as_bytes(), "<inline>")
    }

    fn read<R: Read>(&self, source: R, source_name: &str) -> DatasetResult<LoadReport> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .flexible(true)
            .from_reader(source);

        let columns = ColumnMap::resolve(reader.headers()?, source_name)?;

        let mut records = Vec::new();
        let mut rows_processed = 0;
        let mut rows_failed = 0;
        let mut errors = Vec::new();

        for (line_num, result) in reader.records().enumerate() {
            let actual_line = if self.has_header {
                line_num + 2
            } else {
                line_num + 1
            };

            let row = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(format!("Line {}: {}", actual_line, e));
                    rows_failed += 1;
                    continue;
                }
            };

            match self.melt_row(&row, &columns) {
                Ok(melted) => {
                    records.extend(melted);
                    rows_processed += 1;
                }
                Err(e) => {
                    errors.push(format!("Line {}: {}", actual_line, e));
                    rows_failed += 1;
                }
            }
        }

        if errors.len() > MAX_REPORTED_ERRORS {
            let total = errors.len();
            errors.truncate(MAX_REPORTED_ERRORS);
            errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }

        if records.is_empty() {
            return Err(DatasetError::Empty(format!(
                "{} produced no rows ({} failed)",
                source_name, rows_failed
            )));
        }

        tracing::debug!(
            source = source_name,
            rows_processed,
            rows_failed,
            records = records.len(),
            "Dataset CSV parsed"
        );

        Ok(LoadReport {
            records,
            rows_processed,
            rows_failed,
            errors,
        })
    }

    /// Turn one wide row into one record per disease
    fn melt_row(
        &self,
        row: &csv::StringRecord,
        columns: &ColumnMap,
    ) -> Result<Vec<DeathRecord>, String> {
        let country = row
            .get(columns.country)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "missing country".to_string())?;

        let year_str = row.get(columns.year).map(str::trim).unwrap_or_default();
        let year = parse_year(year_str).ok_or_else(|| format!("invalid year '{}'", year_str))?;

        let sub_region = columns
            .sub_region
            .and_then(|idx| row.get(idx))
            .map(str::trim)
            .unwrap_or_default();

        let population = columns
            .population
            .and_then(|idx| row.get(idx))
            .and_then(parse_value)
            .filter(|p| *p > 0.0);

        let iso_alpha = self.iso.get(country).map(str::to_string);

        let melted = columns
            .diseases
            .iter()
            .map(|(disease, idx)| {
                let count = row.get(*idx).and_then(parse_value);
                let per_1000 = match (count, population) {
                    (Some(c), Some(p)) => Some(c / p * 1000.0),
                    _ => None,
                };

                DeathRecord {
                    country: country.to_string(),
                    year,
                    sub_region: sub_region.to_string(),
                    disease: *disease,
                    count,
                    count_per_1000_under5: per_1000,
                    iso_alpha: iso_alpha.clone(),
                }
            })
            .collect();

        Ok(melted)
    }
}

/// Years may be exported as `1990` or `1990.0`
fn parse_year(s: &str) -> Option<i32> {
    let year = match s.parse::<i32>() {
        Ok(year) => year,
        Err(_) => match s.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 && v.abs() <= f64::from(*YEAR_RANGE.end()) => v as i32,
            _ => return None,
        },
    };
    YEAR_RANGE.contains(&year).then_some(year)
}

/// Empty, NaN and negative cells are missing values
fn parse_value(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => None,
    }
}
