//! Opening a store from a URL
//!
//! | URL | Backend |
//! |-----|---------|
//! | `memory:` | [`MemoryStore`] |
//! | `sqlite::memory:` | [`SqliteStore`], private in-memory database |
//! | `sqlite:<path>` / `sqlite://<path>` | [`SqliteStore`] on a file |

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryStore;
use crate::sqlite::SqliteStore;
use crate::store::DocumentStore;

/// Opens a connection to a document store.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Attempt one connection.
    async fn connect(&self) -> StoreResult<Arc<dyn DocumentStore>>;

    /// Human-readable target, for logs
    fn describe(&self) -> String;
}

/// Connector for a fresh [`MemoryStore`]
#[derive(Debug, Default)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
}

impl MemoryConnector {
    /// Connector handing out one shared, initially empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector handing out an existing store
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> StoreResult<Arc<dyn DocumentStore>> {
        let store: Arc<dyn DocumentStore> = self.store.clone();
        Ok(store)
    }

    fn describe(&self) -> String {
        "memory:".to_string()
    }
}

/// Connector for a [`SqliteStore`]
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: Option<PathBuf>,
}

impl SqliteConnector {
    /// Connector for a database file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Connector for a private in-memory database
    pub fn in_memory() -> Self {
        Self { path: None }
    }
}

#[async_trait]
impl Connector for SqliteConnector {
    async fn connect(&self) -> StoreResult<Arc<dyn DocumentStore>> {
        let path = self.path.clone();
        let store = tokio::task::spawn_blocking(move || match path {
            Some(p) => SqliteStore::open(p),
            None => SqliteStore::open_in_memory(),
        })
        .await??;
        let store: Arc<dyn DocumentStore> = Arc::new(store);
        Ok(store)
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(p) => format!("sqlite:{}", p.display()),
            None => "sqlite::memory:".to_string(),
        }
    }
}

/// Build the connector named by a store URL.
///
/// # Errors
///
/// Returns `UnsupportedUrl` for any scheme other than `memory:` and `sqlite:`.
pub fn connector_for_url(url: &str) -> StoreResult<Arc<dyn Connector>> {
    let url = url.trim();
    if url == "memory:" || url == "memory" {
        return Ok(Arc::new(MemoryConnector::new()));
    }
    if let Some(rest) = url.strip_prefix("sqlite:") {
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        if rest == ":memory:" {
            return Ok(Arc::new(SqliteConnector::in_memory()));
        }
        if rest.is_empty() {
            return Err(StoreError::UnsupportedUrl(url.to_string()));
        }
        return Ok(Arc::new(SqliteConnector::file(rest)));
    }
    Err(StoreError::UnsupportedUrl(url.to_string()))
}
