//! The document store contract
//!
//! Collections are created on first use. Each method is a single atomic
//! operation on one collection; anything spanning several calls (read then
//! write) is not atomic and callers must not assume it is.

use async_trait::async_trait;
use docgate_core::{Document, ID_FIELD};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// Maximum collection name length in bytes
pub const MAX_COLLECTION_BYTES: usize = 120;

/// Reserved collection prefix
pub const RESERVED_COLLECTION_PREFIX: &str = "system.";

/// Partial update applied to one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    /// Fields written with new values
    pub set: Document,
    /// Fields removed from the document
    pub unset: Vec<String>,
}

/// Async access to a document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by identifier.
    async fn find_one(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Fetch every document matching `filter`, ordered by identifier.
    ///
    /// See [`matches_filter`] for the matching rules.
    async fn find(&self, collection: &str, filter: &Document) -> StoreResult<Vec<Document>>;

    /// Insert a new document. Fails with `DuplicateId` if the identifier exists.
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<()>;

    /// Apply `update` to an existing document. Returns false if none matched.
    async fn update(&self, collection: &str, id: &str, update: Update) -> StoreResult<bool>;

    /// Remove a document. Returns false if none matched.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;
}

/// Check a collection name before acquiring the collection.
///
/// Names must be non-empty, at most 120 bytes, free of `$` and NUL, and must
/// not use the `system.` prefix.
pub fn validate_collection(name: &str) -> StoreResult<()> {
    if name.is_empty()
        || name.len() > MAX_COLLECTION_BYTES
        || name.contains('$')
        || name.contains('\0')
        || name.starts_with(RESERVED_COLLECTION_PREFIX)
    {
        return Err(StoreError::InvalidCollection(name.to_string()));
    }
    Ok(())
}

/// Identifier of a document about to be written
pub(crate) fn document_id(doc: &Document) -> StoreResult<String> {
    doc.get(ID_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::InvalidDocument(format!("missing string '{ID_FIELD}'")))
}

/// Equality filter matching.
///
/// A document matches when, for every filter entry, the document holds an
/// equal value at that field. Dotted names (`address.city`) descend into
/// nested objects. The empty filter matches everything.
pub fn matches_filter(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(field, expected)| lookup(doc, field) == Some(expected))
}

fn lookup<'a>(doc: &'a Document, field: &str) -> Option<&'a Value> {
    if let Some(v) = doc.get(field) {
        return Some(v);
    }
    let mut parts = field.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Apply a set/unset update in place. `_id` is never changed.
pub fn apply_update(doc: &mut Document, update: &Update) {
    for (field, value) in &update.set {
        if field != ID_FIELD {
            doc.insert(field.clone(), value.clone());
        }
    }
    for field in &update.unset {
        if field != ID_FIELD {
            doc.remove(field);
        }
    }
}
