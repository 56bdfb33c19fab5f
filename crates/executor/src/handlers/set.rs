//! Set handler (upsert).
//!
//! Steps:
//! 1. read the existing document by key
//! 2. build the document to write and stamp `updated_at`
//! 3. move every empty-string field into the unset list
//! 4. existing: update with set/unset; missing: stamp `created_at`, insert
//! 5. re-read and report the key of what the store now holds
//!
//! `created_at` is only ever written by step 4's insert branch; a
//! caller-supplied value is dropped on update and replaced on insert.

use docgate_core::{
    format_timestamp, from_store_id, to_store_document, Clock, Document, Record, CREATED_AT,
    ID_FIELD, UPDATED_AT,
};
use docgate_storage::{DocumentStore, Update};
use serde_json::Value;

use crate::{Error, Output, Result};

/// Handle Set.
pub async fn set(
    store: &dyn DocumentStore,
    collection: &str,
    record: Record,
    clock: &dyn Clock,
) -> Result<Output> {
    let mut doc = to_store_document(&record)?;
    let id = doc
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_request("record key did not produce an identifier"))?;

    let existing = store.find_one(collection, &id).await?;

    let now = Value::String(format_timestamp(clock.now()));
    doc.insert(UPDATED_AT.to_string(), now.clone());
    let Update { mut set, mut unset } = split_unset(doc);
    unset.retain(|field| field != CREATED_AT);

    if existing.is_some() {
        set.remove(CREATED_AT);
        store.update(collection, &id, Update { set, unset }).await?;
    } else {
        set.insert(CREATED_AT.to_string(), now);
        store.insert(collection, set).await?;
    }

    let written = store.find_one(collection, &id).await?.ok_or_else(|| Error::Store {
        reason: format!("record '{id}' missing after write"),
    })?;
    let stored_id = written
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidDocument {
            reason: format!("record '{id}' has no identifier"),
        })?;
    Ok(Output::Key(from_store_id(stored_id)))
}

/// Split a document into the fields to write and the fields to remove.
///
/// A field whose value is the empty string means "remove this field".
pub(crate) fn split_unset(doc: Document) -> Update {
    let mut update = Update::default();
    for (field, value) in doc {
        match value {
            Value::String(s) if s.is_empty() => update.unset.push(field),
            other => {
                update.set.insert(field, other);
            }
        }
    }
    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_unset() {
        let doc = json!({"_id": "u1", "name": "", "age": 3, "note": " ", "nested": {"x": ""}});
        let update = split_unset(doc.as_object().cloned().unwrap());
        assert_eq!(update.unset, vec!["name".to_string()]);
        assert_eq!(
            Value::Object(update.set),
            json!({"_id": "u1", "age": 3, "note": " ", "nested": {"x": ""}})
        );
    }
}
