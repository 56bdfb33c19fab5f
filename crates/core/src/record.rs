//! Conversion between caller records and store documents
//!
//! A [`Record`] is what callers send and receive: a JSON object carrying a
//! `key` field. A [`Document`] is what the store persists: the same object
//! with `key` replaced by the `_id` identifier string.
//!
//! Both conversions work on copies; the input value is never modified.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::key::{from_store_id, DatasetKey, KeyError};

/// Caller-facing dataset record
pub type Record = Map<String, Value>;

/// Store-facing document
pub type Document = Map<String, Value>;

/// Field holding the dataset key in a record
pub const KEY_FIELD: &str = "key";

/// Field holding the store identifier in a document
pub const ID_FIELD: &str = "_id";

/// Timestamp of the first write, never overwritten
pub const CREATED_AT: &str = "created_at";

/// Timestamp of the latest write
pub const UPDATED_AT: &str = "updated_at";

/// Record/document conversion errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Record has no `key` field
    #[error("record has no '{}' field", KEY_FIELD)]
    MissingKey,

    /// Record key violates the key grammar
    #[error("invalid record key: {0}")]
    InvalidKey(#[from] KeyError),

    /// Document has no string `_id` field
    #[error("document has no string '{}' field", ID_FIELD)]
    MissingId,
}

/// Convert a record into the document the store persists.
///
/// # Examples
///
/// ```
/// use docgate_core::to_store_document;
/// use serde_json::json;
///
/// let record = json!({"key": ["org", "u1"], "name": "Ann"});
/// let doc = to_store_document(record.as_object().unwrap()).unwrap();
/// assert_eq!(doc["_id"], json!("org,u1"));
/// assert!(!doc.contains_key("key"));
/// ```
pub fn to_store_document(record: &Record) -> Result<Document, CodecError> {
    let key_value = record.get(KEY_FIELD).ok_or(CodecError::MissingKey)?;
    let key = DatasetKey::from_value(key_value)?;

    let mut doc = record.clone();
    doc.remove(KEY_FIELD);
    doc.insert(ID_FIELD.to_string(), Value::String(key.to_store_id()));
    Ok(doc)
}

/// Convert a stored document back into a caller record.
pub fn from_store_document(doc: &Document) -> Result<Record, CodecError> {
    let id = doc
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .ok_or(CodecError::MissingId)?;
    let key = from_store_id(id);

    let mut record = doc.clone();
    record.remove(ID_FIELD);
    record.insert(KEY_FIELD.to_string(), key.to_value());
    Ok(record)
}
