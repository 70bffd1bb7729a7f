//! Mortality Dataset
//!
//! The read-only data layer:
//!
//! - **Types**: `DeathRecord`, `Disease`, `StatMode`, `YearBounds`
//! - **Loader**: melts the cleaned wide CSV into long-format records
//! - **ISO lookup**: country name to map code join
//! - **Store**: the immutable, shareable table

mod error;
mod iso;
mod loader;
mod store;
mod types;

pub use error::{DatasetError, DatasetResult};
pub use iso::IsoLookup;
pub use loader::{DatasetLoader, LoadReport};
pub use store::{CountryInfo, DatasetStats, DatasetStore};
pub use types::{DeathRecord, Disease, StatMode, YearBounds};
