//! Error conversion from lower-layer error types.

use docgate_core::{CodecError, KeyError};
use docgate_storage::StoreError;

use crate::Error;

impl From<KeyError> for Error {
    fn from(err: KeyError) -> Self {
        Error::InvalidKey {
            reason: err.to_string(),
        }
    }
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MissingKey => Error::InvalidRequest {
                reason: err.to_string(),
            },
            CodecError::InvalidKey(e) => e.into(),
            CodecError::MissingId => Error::InvalidDocument {
                reason: err.to_string(),
            },
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => Error::Unavailable,
            other => Error::Store {
                reason: other.to_string(),
            },
        }
    }
}
