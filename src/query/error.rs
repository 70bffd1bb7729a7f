//! Query error types
//!
//! Errors raised inside the filter/aggregate pipeline. The executor never
//! lets these reach a caller as a failure; they surface as an empty result
//! with a diagnostic. Request handlers use them to reject bad input.

use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Selection contains a value no widget can produce
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// An aggregated metric overflowed or became NaN
    #[error("Non-finite metric for '{0}'")]
    NonFiniteMetric(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
