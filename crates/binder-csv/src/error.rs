//! CSV error types

use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur during CSV operations
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// More rows or columns than a sheet can address
    #[error("CSV too large: row {row}, column {column} is outside the sheet")]
    TooLarge { row: usize, column: usize },

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] binder_core::Error),
}
