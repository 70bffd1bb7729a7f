//! # Childmort
//!
//! Child Mortality Dashboard - an interactive service for exploring deaths of
//! children under five by disease across African countries, 1990-2015.
//!
//! ## Features
//!
//! - **Filter, aggregate, render**: every chart is one pass over the dataset
//! - **Two tabs**: trends over a year range, and a single-year snapshot
//! - **Country widgets**: select-all, deselect-all and multi-select reconciliation
//! - **Real-time**: one WebSocket session per dashboard page
//!
//! ## Modules
//!
//! - [`dataset`]: CSV loading and the in-memory record store
//! - [`query`]: Selections, filtering, aggregation and ranking
//! - [`render`]: Line, bar and choropleth chart rendering
//! - [`controls`]: Widget state machine and per-view rendering
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Live dashboard sessions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use childmort::dataset::{DatasetStore, IsoLookup};
//! use childmort::query::{GroupKey, QueryExecutor, Selection};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DatasetStore::load(Path::new("data/clean_data.csv"), IsoLookup::builtin())?;
//!     let executor = QueryExecutor::new(Arc::new(store));
//!
//!     let selection = Selection::year(2005)
//!         .countries(["Nigeria", "Chad", "Mali"])
//!         .top_n(3)
//!         .build();
//!     let output = executor.ranking(&selection, GroupKey::Country);
//!
//!     for row in &output.data.rows {
//!         println!("{}. {} {}", row.rank, row.key, row.metric);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod controls;
pub mod dataset;
pub mod query;
pub mod render;
pub mod websocket;

// Re-export top-level types for convenience
pub use dataset::{
    DatasetError, DatasetResult, DatasetStore, DeathRecord, Disease, IsoLookup, StatMode,
    YearBounds,
};

pub use query::{
    GroupKey, QueryError, QueryExecutor, QueryOutput, QueryResult, Selection, YearFilter,
};

pub use render::{ChartLabels, ChartRenderer, RenderArtifact, SvgRenderer};

pub use controls::{
    ControlError, CountrySelector, DashboardSession, SelectorEvent, SelectorState, Tab, View,
    WidgetChange,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{websocket_handler, ClientMessage, ConnectionHub, HubConfig, ServerMessage};

pub use config::{ApiConfig, Config, ConfigError, DashboardConfig, DatasetConfig, LoggingConfig};
