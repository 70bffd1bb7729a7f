//! Selection types
//!
//! A `Selection` is the full set of filter values behind one view: a year or
//! year range, the chosen countries and diseases, the statistic, and for
//! ranked views the top-N cut-off. Selections are rebuilt from widget state
//! on every interaction and never stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::dataset::{DeathRecord, Disease, StatMode, YearBounds};
use crate::query::error::{QueryError, QueryResult};

/// Year filter: one year (snapshot views) or an inclusive range (trend views)
///
/// Serialized as a bare number or a `[lo, hi]` pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum YearFilter {
    Single(i32),
    Range(i32, i32),
}

impl YearFilter {
    /// Build a range, swapping reversed bounds
    pub fn range(a: i32, b: i32) -> Self {
        YearFilter::Range(a.min(b), a.max(b))
    }

    pub fn matches(&self, year: i32) -> bool {
        match *self {
            YearFilter::Single(y) => year == y,
            YearFilter::Range(lo, hi) => lo <= year && year <= hi,
        }
    }

    /// Fit the filter to the years the data covers
    ///
    /// A single year is clamped to the nearest bound. A range is intersected
    /// with the bounds; a range lying wholly outside them becomes empty.
    pub fn clamp(&self, bounds: YearBounds) -> Self {
        match *self {
            YearFilter::Single(y) => YearFilter::Single(bounds.clamp(y)),
            YearFilter::Range(a, b) => {
                let (lo, hi) = (a.min(b), a.max(b));
                YearFilter::Range(lo.max(bounds.min), hi.min(bounds.max))
            }
        }
    }

    /// True when no year can match
    pub fn is_empty(&self) -> bool {
        matches!(*self, YearFilter::Range(lo, hi) if lo > hi)
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::Single(y) => write!(f, "{}", y),
            YearFilter::Range(lo, hi) => write!(f, "{}-{}", lo, hi),
        }
    }
}

/// What aggregated rows are keyed by
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    #[default]
    Country,
    Disease,
}

impl GroupKey {
    /// The group key of a record
    pub fn key_of<'a>(&self, record: &'a DeathRecord) -> &'a str {
        match self {
            GroupKey::Country => &record.country,
            GroupKey::Disease => record.disease.name(),
        }
    }

    /// Legend / axis title for the key
    pub fn label(&self) -> &'static str {
        match self {
            GroupKey::Country => "Country",
            GroupKey::Disease => "Disease",
        }
    }
}

/// Current filter values for one view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Selection {
    pub year_filter: YearFilter,
    #[serde(default)]
    pub countries: BTreeSet<String>,
    #[serde(default)]
    pub diseases: BTreeSet<Disease>,
    #[serde(default)]
    pub stat_mode: StatMode,
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl Selection {
    /// Start a single-year selection
    pub fn year(year: i32) -> SelectionBuilder {
        SelectionBuilder::new(YearFilter::Single(year))
    }

    /// Start a year-range selection
    pub fn years(lo: i32, hi: i32) -> SelectionBuilder {
        SelectionBuilder::new(YearFilter::range(lo, hi))
    }

    /// Reject values no widget can produce
    pub fn validate(&self) -> QueryResult<()> {
        if self.top_n == Some(0) {
            return Err(QueryError::InvalidSelection(
                "top_n must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy of this selection with the year filter fitted to `bounds`
    pub fn clamped(&self, bounds: YearBounds) -> Self {
        Self {
            year_filter: self.year_filter.clamp(bounds),
            ..self.clone()
        }
    }

    /// True when the selection can never match a row
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() || self.diseases.is_empty() || self.year_filter.is_empty()
    }
}

/// Builder for selections
#[derive(Debug, Clone)]
pub struct SelectionBuilder {
    selection: Selection,
}

impl SelectionBuilder {
    fn new(year_filter: YearFilter) -> Self {
        Self {
            selection: Selection {
                year_filter,
                countries: BTreeSet::new(),
                diseases: BTreeSet::new(),
                stat_mode: StatMode::Absolute,
                top_n: None,
            },
        }
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.selection.countries.insert(country.into());
        self
    }

    pub fn countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection
            .countries
            .extend(countries.into_iter().map(Into::into));
        self
    }

    pub fn disease(mut self, disease: Disease) -> Self {
        self.selection.diseases.insert(disease);
        self
    }

    pub fn diseases<I: IntoIterator<Item = Disease>>(mut self, diseases: I) -> Self {
        self.selection.diseases.extend(diseases);
        self
    }

    pub fn stat_mode(mut self, mode: StatMode) -> Self {
        self.selection.stat_mode = mode;
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.selection.top_n = Some(n);
        self
    }

    pub fn build(self) -> Selection {
        self.selection
    }
}
