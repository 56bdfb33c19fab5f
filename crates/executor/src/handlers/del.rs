//! Del handler.

use docgate_core::DatasetKey;
use docgate_storage::DocumentStore;

use super::to_record;
use crate::{Output, Result};

/// Handle Del.
///
/// Reads the record first so it can be returned, then removes it. Deleting
/// a key that does not exist is not an error and yields `None`.
pub async fn del(store: &dyn DocumentStore, collection: &str, key: DatasetKey) -> Result<Output> {
    let id = key.to_store_id();
    let existing = store.find_one(collection, &id).await?;
    let record = existing.as_ref().map(to_record).transpose()?;

    store.delete(collection, &id).await?;
    Ok(Output::MaybeRecord(record))
}
