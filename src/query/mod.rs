//! Filter/Aggregate Pipeline
//!
//! The per-interaction computation behind every chart:
//!
//! - **Selection**: the filter values for one view
//! - **Filter**: selection → matching records
//! - **Aggregate**: records → grouped sums, ranks, colour domain, trends
//! - **Executor**: runs a full pass against the shared dataset
//!
//! # Example
//!
//! ```rust,ignore
//! use childmort::query::{GroupKey, QueryExecutor, Selection};
//! use childmort::dataset::Disease;
//!
//! let selection = Selection::year(2010)
//!     .countries(["Nigeria", "Chad"])
//!     .diseases([Disease::Hiv, Disease::Malaria])
//!     .top_n(8)
//!     .build();
//!
//! let output = executor.ranking(&selection, GroupKey::Country);
//! for row in &output.data.rows {
//!     println!("{} {} {}", row.rank, row.key, row.metric);
//! }
//! ```

mod aggregate;
mod error;
mod executor;
mod filter;
mod selection;

pub use aggregate::{
    aggregate, group_sums, rank, trend, AggregatedRow, Aggregation, ColorDomain, TrendPoint,
    TrendSeries,
};
pub use error::{QueryError, QueryResult};
pub use executor::{MapData, MapRegion, QueryExecutor, QueryOutput};
pub use filter::{filter, matches};
pub use selection::{GroupKey, Selection, SelectionBuilder, YearFilter};
