//! Catalog error types

use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Errors raised while talking to the catalog or its cache
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response
    #[error("catalog returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// Malformed response or cache file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (cache file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog knows no card by this name
    #[error("card not found: {0}")]
    NotFound(String),

    /// Base URL could not be combined into a request URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    /// Whether this is a "no such card" answer rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}
