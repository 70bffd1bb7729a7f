//! Dataset Store
//!
//! Immutable in-memory table of death records, loaded once at start-up and
//! shared by every request handler and session through an `Arc`. Nothing
//! writes to it after construction, so no locking is involved.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use super::error::{DatasetError, DatasetResult};
use super::iso::IsoLookup;
use super::loader::DatasetLoader;
use super::types::{DeathRecord, Disease, YearBounds};

/// A country in the selection universe
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountryInfo {
    pub name: String,
    pub sub_region: String,
    pub iso_alpha: Option<String>,
}

/// Read-only mortality table
#[derive(Debug)]
pub struct DatasetStore {
    records: Vec<DeathRecord>,
    countries: Vec<CountryInfo>,
    sub_regions: Vec<String>,
    years: YearBounds,
    iso: IsoLookup,
}

/// Summary statistics about the loaded data
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub record_count: usize,
    pub country_count: usize,
    pub years: YearBounds,
    pub missing_iso: Vec<String>,
}

impl std::fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, {} countries, years {}",
            self.record_count, self.country_count, self.years
        )
    }
}

impl DatasetStore {
    /// Build a store from already-melted records
    ///
    /// The country universe keeps first-appearance order.
    pub fn from_records(records: Vec<DeathRecord>, iso: IsoLookup) -> DatasetResult<Self> {
        let first = records
            .first()
            .ok_or_else(|| DatasetError::Empty("no records".to_string()))?;
        let mut years = YearBounds::new(first.year, first.year);

        let mut seen = HashSet::new();
        let mut countries = Vec::new();
        let mut sub_regions = BTreeSet::new();

        for record in &records {
            years.extend(record.year);
            if !record.sub_region.is_empty() {
                sub_regions.insert(record.sub_region.clone());
            }
            if seen.insert(record.country.clone()) {
                countries.push(CountryInfo {
                    name: record.country.clone(),
                    sub_region: record.sub_region.clone(),
                    iso_alpha: record.iso_alpha.clone(),
                });
            }
        }

        Ok(Self {
            records,
            countries,
            sub_regions: sub_regions.into_iter().collect(),
            years,
            iso,
        })
    }

    /// Load from a cleaned CSV export
    pub fn load(path: &Path, iso: IsoLookup) -> DatasetResult<Self> {
        Self::load_with(&DatasetLoader::new().with_iso(iso), path)
    }

    /// Load with an explicitly configured loader
    pub fn load_with(loader: &DatasetLoader, path: &Path) -> DatasetResult<Self> {
        let start = Instant::now();
        let report = loader.load(path)?;

        if report.rows_failed > 0 {
            tracing::warn!(
                path = ?path,
                rows_failed = report.rows_failed,
                first_error = report.errors.first().map(String::as_str).unwrap_or(""),
                "Some dataset rows were skipped"
            );
        }

        let store = Self::from_records(report.records, loader.iso().clone())?;
        tracing::info!(
            path = ?path,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Dataset loaded: {}",
            store.stats()
        );
        Ok(store)
    }

    /// Every record
    pub fn records(&self) -> &[DeathRecord] {
        &self.records
    }

    /// The country universe
    pub fn countries(&self) -> &[CountryInfo] {
        &self.countries
    }

    /// Country names, in universe order
    pub fn country_names(&self) -> Vec<String> {
        self.countries.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_country(&self, name: &str) -> bool {
        self.countries.iter().any(|c| c.name == name)
    }

    /// Disease categories available for selection
    pub fn diseases(&self) -> &'static [Disease] {
        Disease::all()
    }

    pub fn sub_regions(&self) -> &[String] {
        &self.sub_regions
    }

    /// Years covered by the data
    pub fn years(&self) -> YearBounds {
        self.years
    }

    pub fn iso(&self) -> &IsoLookup {
        &self.iso
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            record_count: self.records.len(),
            country_count: self.countries.len(),
            years: self.years,
            missing_iso: self
                .countries
                .iter()
                .filter(|c| c.iso_alpha.is_none())
                .map(|c| c.name.clone())
                .collect(),
        }
    }
}
