//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::controls::{SelectorEvent, SelectorState};
use crate::dataset::{CountryInfo, Disease, StatMode, YearBounds};
use crate::query::{
    AggregatedRow, ColorDomain, GroupKey, MapRegion, QueryOutput, TrendPoint, YearFilter,
};
use crate::render::RenderArtifact;

// ============================================
// DATASET DTOs
// ============================================

/// Dataset overview for building the widgets
#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    pub countries: Vec<String>,
    pub diseases: Vec<Disease>,
    pub years: YearBounds,
    pub sub_regions: Vec<String>,
    pub record_count: usize,
    /// Countries that cannot be drawn on the map
    pub missing_iso: Vec<String>,
    pub defaults: DashboardConfig,
}

/// Country universe with map codes
#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    pub countries: Vec<CountryInfo>,
    pub count: usize,
}

// ============================================
// PIPELINE DTOs
// ============================================

fn default_diseases() -> Vec<Disease> {
    Disease::specific().to_vec()
}

fn default_format() -> String {
    "json".to_string()
}

/// Trend request
#[derive(Debug, Deserialize)]
pub struct TrendRequest {
    /// Inclusive `[from, to]`; reversed bounds are accepted
    pub year_range: (i32, i32),
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default = "default_diseases")]
    pub diseases: Vec<Disease>,
    #[serde(default)]
    pub stat_mode: StatMode,
    #[serde(default)]
    pub group_by: GroupKey,
    /// Output format: json, csv, svg
    #[serde(default = "default_format")]
    pub format: String,
}

/// Single-year ranking request
#[derive(Debug, Deserialize)]
pub struct RankingRequest {
    pub year: i32,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default = "default_diseases")]
    pub diseases: Vec<Disease>,
    #[serde(default)]
    pub stat_mode: StatMode,
    #[serde(default)]
    pub group_by: GroupKey,
    /// Country rankings only; the disease ranking uses the configured cut-off
    #[serde(default)]
    pub top_n: Option<usize>,
    /// Output format: json, csv, svg
    #[serde(default = "default_format")]
    pub format: String,
}

/// Map request
#[derive(Debug, Deserialize)]
pub struct MapRequest {
    pub year: i32,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default = "default_diseases")]
    pub diseases: Vec<Disease>,
    #[serde(default)]
    pub stat_mode: StatMode,
}

/// Execution statistics of one pass
#[derive(Debug, Serialize)]
pub struct QueryMeta {
    /// Year filter actually applied
    pub year_filter: YearFilter,
    pub rows_scanned: usize,
    pub rows_matched: usize,
    pub execution_time_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl QueryMeta {
    pub fn from_output<T>(output: &QueryOutput<T>) -> Self {
        Self {
            year_filter: output.year_filter,
            rows_scanned: output.rows_scanned,
            rows_matched: output.rows_matched,
            execution_time_us: output.execution_time_us,
            diagnostic: output.diagnostic.clone(),
        }
    }
}

/// Trend response
#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub group_by: GroupKey,
    pub points: Vec<TrendPoint>,
    pub domain: Option<ColorDomain>,
    pub meta: QueryMeta,
}

/// Ranking response
#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub group_by: GroupKey,
    pub rows: Vec<AggregatedRow>,
    pub domain: Option<ColorDomain>,
    /// Groups before top-N truncation
    pub group_count: usize,
    pub meta: QueryMeta,
}

/// Map response
#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub artifact: RenderArtifact,
    pub regions: Vec<MapRegion>,
    pub domain: Option<ColorDomain>,
    pub meta: QueryMeta,
}

// ============================================
// CONTROL DTOs
// ============================================

/// Stateless selector transition
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    #[serde(default)]
    pub state: SelectorState,
    pub event: SelectorEvent,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Dataset status
    pub dataset: String,
    pub record_count: usize,
    /// Chart backend name
    pub renderer: String,
    pub websocket_connections: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    pub started_at: DateTime<Utc>,
    /// Application version
    pub version: String,
}
