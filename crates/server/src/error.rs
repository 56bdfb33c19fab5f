//! Transport-level errors.

use std::io;

use thiserror::Error;

/// Errors raised while framing HTTP requests
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Declared body exceeds the configured cap
    #[error("payload too large: {length} bytes exceeds limit {limit}")]
    PayloadTooLarge {
        /// Declared `Content-Length`
        length: usize,
        /// Configured cap
        limit: usize,
    },

    /// Request line or headers cannot be parsed
    #[error("malformed request: {0}")]
    Malformed(String),

    /// Socket error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl GatewayError {
    /// Status code answered for this error, if any answer is possible
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::PayloadTooLarge { .. } => Some(413),
            GatewayError::Malformed(_) => Some(400),
            GatewayError::Io(_) => None,
        }
    }
}
