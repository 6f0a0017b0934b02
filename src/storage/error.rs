//! Storage error types
//!
//! Defines all errors that can occur while loading, merging and saving the
//! tweet store.

use thiserror::Error;

/// Errors that can occur in the tweet store
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Statistics document could not be interpreted
    #[error("Invalid statistics payload: {0}")]
    Payload(#[from] PayloadError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors produced while reading a statistics payload
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The text is not JSON at all
    #[error("not valid JSON: {0}")]
    NotJson(String),

    /// The top-level JSON value is not an object
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
