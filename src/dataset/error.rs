//! Dataset error types
//!
//! Defines all errors that can occur while loading the mortality tables.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading the dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row
    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    /// The file parsed but produced no usable rows
    #[error("Dataset is empty: {0}")]
    Empty(String),

    /// Country to ISO code table could not be loaded
    #[error("Invalid ISO table {path:?}: {error}")]
    IsoTable { path: PathBuf, error: String },
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::MissingColumn {
            column: "year".to_string(),
            source_name: "clean_data.csv".to_string(),
        };
        assert_eq!(err.to_string(), "Missing column 'year' in clean_data.csv");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DatasetError = io_err.into();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
