//! Error types for command execution.
//!
//! The gateway answers every variant with the same refusal; the variants
//! only tell the logs why.
//!
//! | Category | Variants | Cause |
//! |----------|----------|-------|
//! | Validation | `InvalidRequest`, `InvalidKey` | Bad payload shape or key grammar |
//! | Connection | `Unavailable` | Store never connected |
//! | Operation | `Store`, `InvalidDocument` | Store rejected or returned garbage |

/// Command execution errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // ==================== Validation Errors ====================
    /// Payload shape is not an acceptable request
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Key violates the key grammar
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },

    // ==================== Connection Errors ====================
    /// No connected store
    #[error("store unavailable")]
    Unavailable,

    // ==================== Operation Errors ====================
    /// Store rejected the operation
    #[error("store error: {reason}")]
    Store { reason: String },

    /// Stored document cannot be converted back to a record
    #[error("invalid stored document: {reason}")]
    InvalidDocument { reason: String },
}

impl Error {
    pub(crate) fn invalid_request(reason: impl Into<String>) -> Self {
        Error::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Short reason code for logs
    pub fn reason_code(&self) -> &'static str {
        match self {
            Error::InvalidRequest { .. } => "invalid_request",
            Error::InvalidKey { .. } => "invalid_key",
            Error::Unavailable => "unavailable",
            Error::Store { .. } => "store_error",
            Error::InvalidDocument { .. } => "invalid_document",
        }
    }

    /// True for errors caused by the request itself
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidRequest { .. } | Error::InvalidKey { .. })
    }
}
