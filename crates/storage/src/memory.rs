//! In-process document store
//!
//! Documents live in a `BTreeMap` per collection behind one `RwLock`, so
//! every trait method is atomic and `find` returns documents in identifier
//! order. Nothing survives the process.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use docgate_core::Document;
use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{apply_update, document_id, matches_filter, validate_collection, DocumentStore, Update};

type Collection = BTreeMap<String, Document>;

/// Memory-backed [`DocumentStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// True if the collection holds no documents
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        validate_collection(collection)?;
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &Document) -> StoreResult<Vec<Document>> {
        validate_collection(collection)?;
        let guard = self.collections.read();
        let Some(docs) = guard.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .values()
            .filter(|doc| matches_filter(doc, filter))
            .cloned()
            .collect())
    }

    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<()> {
        validate_collection(collection)?;
        let id = document_id(&doc)?;
        let mut guard = self.collections.write();
        let docs = guard.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        docs.insert(id, doc);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, update: Update) -> StoreResult<bool> {
        validate_collection(collection)?;
        let mut guard = self.collections.write();
        match guard.get_mut(collection).and_then(|c| c.get_mut(id)) {
            Some(doc) => {
                apply_update(doc, &update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        validate_collection(collection)?;
        let mut guard = self.collections.write();
        Ok(guard
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .is_some())
    }
}
