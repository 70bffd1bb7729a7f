//! Core data types for the mortality dataset
//!
//! - `Disease`: the cause-of-death categories tracked per country and year
//! - `DeathRecord`: one (country, year, disease) observation
//! - `StatMode`: which numeric field of a record a view reads
//! - `YearBounds`: the inclusive year span covered by the loaded data

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cause-of-death category
///
/// `Total` comes from an independent source column and is not the sum of the
/// five specific categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Disease {
    #[serde(rename = "HIV", alias = "hiv")]
    Hiv,
    #[serde(alias = "malaria")]
    Malaria,
    #[serde(alias = "measles")]
    Measles,
    #[serde(alias = "meningitis")]
    Meningitis,
    #[serde(rename = "NCD", alias = "ncd")]
    Ncd,
    #[serde(alias = "total", alias = "Total deaths")]
    Total,
}

impl Disease {
    /// Every category, in display order
    pub fn all() -> &'static [Disease] {
        &[
            Disease::Hiv,
            Disease::Malaria,
            Disease::Measles,
            Disease::Meningitis,
            Disease::Ncd,
            Disease::Total,
        ]
    }

    /// The five specific categories (everything except `Total`)
    pub fn specific() -> &'static [Disease] {
        &[
            Disease::Hiv,
            Disease::Malaria,
            Disease::Measles,
            Disease::Meningitis,
            Disease::Ncd,
        ]
    }

    /// Display name, also used as the group key when aggregating by disease
    pub fn name(&self) -> &'static str {
        match self {
            Disease::Hiv => "HIV",
            Disease::Malaria => "Malaria",
            Disease::Measles => "Measles",
            Disease::Meningitis => "Meningitis",
            Disease::Ncd => "NCD",
            Disease::Total => "Total",
        }
    }

    /// Source column in the cleaned wide-format CSV
    pub fn source_column(&self) -> &'static str {
        match self {
            Disease::Hiv => "hiv_deaths_in_children_1_59_months_total_deaths",
            Disease::Malaria => "malaria_deaths_in_children_1_59_months_total_deaths",
            Disease::Measles => "measles_deaths_in_children_1_59_months_total_deaths",
            Disease::Meningitis => "meningitis_deaths_in_children_1_59_months_total_deaths",
            Disease::Ncd => "ncd_deaths_in_children_1_59_months_total_deaths",
            Disease::Total => "number_of_child_deaths",
        }
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Disease {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hiv" => Ok(Disease::Hiv),
            "malaria" => Ok(Disease::Malaria),
            "measles" => Ok(Disease::Measles),
            "meningitis" => Ok(Disease::Meningitis),
            "ncd" => Ok(Disease::Ncd),
            "total" | "total deaths" => Ok(Disease::Total),
            other => Err(format!("Unknown disease: {}", other)),
        }
    }
}

/// Which statistic a view reports
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatMode {
    /// Raw number of deaths
    #[default]
    #[serde(alias = "raw_stats")]
    Absolute,
    /// Deaths per thousand children aged 0-4
    #[serde(alias = "pc_k")]
    PerCapita,
}

impl StatMode {
    /// Axis title for charts
    pub fn axis_label(&self) -> &'static str {
        match self {
            StatMode::Absolute => "Number of deaths",
            StatMode::PerCapita => "Deaths per thousand 0-4-year-olds",
        }
    }

    /// Colour bar title for the map
    pub fn legend_label(&self) -> &'static str {
        match self {
            StatMode::Absolute => "Total deaths",
            StatMode::PerCapita => "Deaths per 1,000 0-4-year-olds",
        }
    }

    /// Decimal places used when formatting values of this statistic
    pub fn precision(&self) -> usize {
        match self {
            StatMode::Absolute => 0,
            StatMode::PerCapita => 2,
        }
    }
}

/// One observation: deaths from one disease in one country and year
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeathRecord {
    pub country: String,
    pub year: i32,
    pub sub_region: String,
    pub disease: Disease,
    /// Absolute number of deaths, `None` when the source cell was empty
    pub count: Option<f64>,
    /// Deaths per 1000 under-five children, `None` without a usable denominator
    pub count_per_1000_under5: Option<f64>,
    /// ISO 3166 alpha-3 code, `None` when the country has no map entry
    pub iso_alpha: Option<String>,
}

impl DeathRecord {
    pub fn new(country: impl Into<String>, year: i32, disease: Disease, count: f64) -> Self {
        Self {
            country: country.into(),
            year,
            sub_region: String::new(),
            disease,
            count: Some(count),
            count_per_1000_under5: None,
            iso_alpha: None,
        }
    }

    /// Builder method: set sub-region
    pub fn sub_region(mut self, sub_region: impl Into<String>) -> Self {
        self.sub_region = sub_region.into();
        self
    }

    /// Builder method: set the per-capita rate
    pub fn per_capita(mut self, rate: f64) -> Self {
        self.count_per_1000_under5 = Some(rate);
        self
    }

    /// Builder method: set the ISO code
    pub fn iso(mut self, iso_alpha: impl Into<String>) -> Self {
        self.iso_alpha = Some(iso_alpha.into());
        self
    }

    /// Value read by the given statistic; missing or NaN values read as 0
    pub fn value(&self, mode: StatMode) -> f64 {
        let raw = match mode {
            StatMode::Absolute => self.count,
            StatMode::PerCapita => self.count_per_1000_under5,
        };
        match raw {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        }
    }
}

/// Inclusive year span
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

impl YearBounds {
    pub fn new(min: i32, max: i32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Clamp a single year into the span
    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min, self.max)
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }

    /// Widen the span to include `year`
    pub fn extend(&mut self, year: i32) {
        self.min = self.min.min(year);
        self.max = self.max.max(year);
    }
}

impl fmt::Display for YearBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}
