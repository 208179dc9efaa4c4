//! Error types for vinyl_scout

use thiserror::Error;

/// Unified error type for vinyl_scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse a JSON document
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search history database operation failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result alias for vinyl_scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;
