//! Core types for docgate
//!
//! This crate defines the translation layer between what callers send and what
//! the document store persists:
//! - DatasetKey: simple or composite key, validated against the token grammar
//! - Store identifiers: the comma-joined string form of a DatasetKey
//! - Record / Document: the caller-facing and store-facing shapes of one dataset
//! - Clock: source of the `created_at` / `updated_at` timestamps

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod key;
pub mod record;

pub use clock::{format_timestamp, Clock, SystemClock};
pub use key::{from_store_id, is_valid_key, is_valid_token, to_store_id, DatasetKey, KeyError};
pub use record::{
    from_store_document, to_store_document, CodecError, Document, Record, CREATED_AT, ID_FIELD,
    KEY_FIELD, UPDATED_AT,
};
