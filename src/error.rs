//! Error types for wordcache
//!
//! This module provides comprehensive error handling for all wordcache
//! operations, including storage, remote fetching, and legacy import.

use thiserror::Error;

/// Main error type for wordcache operations
#[derive(Error, Debug)]
pub enum WordCacheError {
    /// Word store errors (schema, queries, transactions)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Remote fetch errors (first-request failures, malformed envelopes)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Legacy import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(String),
}

/// Result type alias for wordcache operations
pub type Result<T> = std::result::Result<T, WordCacheError>;

impl From<anyhow::Error> for WordCacheError {
    fn from(err: anyhow::Error) -> Self {
        WordCacheError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = WordCacheError::Storage("test error".to_string());
        assert_eq!(error.to_string(), "Storage error: test error");
    }

    #[test]
    fn test_error_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cache_error = WordCacheError::from(io_error);

        match cache_error {
            WordCacheError::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }
}
