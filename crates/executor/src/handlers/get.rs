//! Get handler.

use docgate_storage::DocumentStore;

use super::to_record;
use crate::command::Target;
use crate::{Output, Result};

/// Handle Get.
///
/// - Filter: every matching record, in identifier order.
/// - Key: the record or `None`, never a list.
///
/// The filter is handed to the store untouched, so it addresses stored
/// fields: match on `_id`, not `key`.
pub async fn get(store: &dyn DocumentStore, collection: &str, target: Target) -> Result<Output> {
    match target {
        Target::Filter(filter) => {
            let docs = store.find(collection, &filter).await?;
            let records = docs.iter().map(to_record).collect::<Result<Vec<_>>>()?;
            Ok(Output::Records(records))
        }
        Target::Key(key) => {
            let found = store.find_one(collection, &key.to_store_id()).await?;
            Ok(Output::MaybeRecord(found.as_ref().map(to_record).transpose()?))
        }
    }
}
