//! Error types for document store operations
//!
//! Every variant is recoverable per request: the executor turns all of them
//! into a refusal for that one request and nothing else is affected.

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connected store
    #[error("store unavailable")]
    Unavailable,

    /// Connection attempt failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// Store URL names no known backend
    #[error("unsupported store url '{0}'")]
    UnsupportedUrl(String),

    /// Collection name cannot be used
    #[error("invalid collection name '{0}'")]
    InvalidCollection(String),

    /// Document lacks a string `_id`
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Insert hit an existing identifier
    #[error("duplicate identifier '{0}'")]
    DuplicateId(String),

    /// Backend rejected the operation
    #[error("backend error: {0}")]
    Backend(String),

    /// Stored body could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Backend(format!("blocking task failed: {e}"))
    }
}
