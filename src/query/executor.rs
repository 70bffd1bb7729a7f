//! Query Executor
//!
//! Runs the pipeline for one view against the shared dataset:
//!
//! ```text
//! Selection → Validate → Clamp years → Filter → Aggregate → Output
//! ```
//!
//! Every pass is independent and stateless given its selection. Failures
//! inside a pass never reach the caller as an error: they are logged and
//! turned into an empty output carrying a diagnostic, so the render step
//! can fall back to a placeholder.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::dataset::{DatasetStore, DeathRecord};
use crate::query::aggregate::{self, Aggregation, ColorDomain, TrendSeries};
use crate::query::error::{QueryError, QueryResult};
use crate::query::filter::filter;
use crate::query::selection::{GroupKey, Selection, YearFilter};

/// One region of a choropleth
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapRegion {
    pub country: String,
    /// `None` when the country has no map code; such regions are not drawn
    pub iso_alpha: Option<String>,
    pub metric: f64,
}

/// Per-country totals joined with map codes
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MapData {
    pub regions: Vec<MapRegion>,
    pub domain: Option<ColorDomain>,
}

impl MapData {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Output of one pipeline pass
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput<T> {
    pub data: T,
    /// Year filter after clamping to the dataset's years
    pub year_filter: YearFilter,
    /// Records examined
    pub rows_scanned: usize,
    /// Records that passed the filter
    pub rows_matched: usize,
    /// Execution time in microseconds
    pub execution_time_us: u64,
    /// Why the output is empty, when it is empty because of a failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Query executor
pub struct QueryExecutor {
    store: Arc<DatasetStore>,
}

impl QueryExecutor {
    /// Create a new query executor
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self { store }
    }

    /// The dataset this executor reads
    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }

    /// Trend lines over a year range
    pub fn trend(&self, selection: &Selection, key: GroupKey) -> QueryOutput<TrendSeries> {
        self.run("trend", selection, |rows, selection| {
            let series = aggregate::trend(rows, key, selection.stat_mode);
            if let Some(point) = series.points.iter().find(|p| !p.metric.is_finite()) {
                return Err(QueryError::NonFiniteMetric(point.key.clone()));
            }
            Ok(series)
        })
    }

    /// Ranked totals, truncated to `selection.top_n` when set
    pub fn ranking(&self, selection: &Selection, key: GroupKey) -> QueryOutput<Aggregation> {
        self.run("ranking", selection, |rows, selection| {
            let result = aggregate::aggregate(rows, key, selection.stat_mode, selection.top_n);
            check_finite(&result)?;
            Ok(result)
        })
    }

    /// Per-country totals joined with ISO codes for the choropleth
    pub fn map(&self, selection: &Selection) -> QueryOutput<MapData> {
        self.run("map", selection, |rows, selection| {
            let result = aggregate::aggregate(rows, GroupKey::Country, selection.stat_mode, None);
            check_finite(&result)?;

            let iso = self.store.iso();
            let regions = result
                .rows
                .into_iter()
                .map(|row| {
                    let iso_alpha = iso.get(&row.key).map(str::to_string);
                    if iso_alpha.is_none() {
                        tracing::debug!(country = %row.key, "No map code, region not drawn");
                    }
                    MapRegion {
                        country: row.key,
                        iso_alpha,
                        metric: row.metric,
                    }
                })
                .collect();

            Ok(MapData {
                regions,
                domain: result.domain,
            })
        })
    }

    /// Shared pass: validate, clamp, filter, then hand the rows to `reduce`
    fn run<T, F>(&self, view: &str, selection: &Selection, reduce: F) -> QueryOutput<T>
    where
        T: Default,
        F: FnOnce(&[&DeathRecord], &Selection) -> QueryResult<T>,
    {
        let start = Instant::now();
        let clamped = selection.clamped(self.store.years());
        if clamped.year_filter != selection.year_filter {
            tracing::debug!(
                requested = %selection.year_filter,
                clamped = %clamped.year_filter,
                "Year filter clamped to dataset bounds"
            );
        }

        let rows = filter(self.store.records(), &clamped);
        let rows_matched = rows.len();

        let (data, diagnostic) = match clamped.validate().and_then(|_| reduce(&rows, &clamped)) {
            Ok(data) => (data, None),
            Err(e) => {
                tracing::warn!(view, error = %e, "Pipeline pass failed, returning empty result");
                (T::default(), Some(e.to_string()))
            }
        };

        let output = QueryOutput {
            data,
            year_filter: clamped.year_filter,
            rows_scanned: self.store.len(),
            rows_matched,
            execution_time_us: start.elapsed().as_micros() as u64,
            diagnostic,
        };

        tracing::trace!(
            view,
            rows_scanned = output.rows_scanned,
            rows_matched = output.rows_matched,
            execution_time_us = output.execution_time_us,
            "Pipeline pass complete"
        );

        output
    }
}

fn check_finite(result: &Aggregation) -> QueryResult<()> {
    match result.rows.iter().find(|r| !r.metric.is_finite()) {
        Some(row) => Err(QueryError::NonFiniteMetric(row.key.clone())),
        None => Ok(()),
    }
}
