//! API Routes
//!
//! Route handlers organized by functionality.

pub mod controls;
pub mod dataset;
pub mod format;
pub mod health;
pub mod snapshot;
pub mod trend;
