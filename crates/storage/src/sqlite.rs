//! SQLite-backed document store
//!
//! All collections share one table keyed by `(collection, id)`; the document
//! body is stored as JSON text. rusqlite is blocking, so every call runs on
//! the blocking pool with the connection behind a mutex.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use docgate_core::Document;
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::error::{StoreError, StoreResult};
use crate::store::{apply_update, document_id, matches_filter, validate_collection, DocumentStore, Update};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (collection, id)
)";

/// SQLite-backed [`DocumentStore`]
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and its schema.
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the file cannot be opened or the schema
    /// cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute(SCHEMA, [])
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut guard)
        })
        .await?
    }
}

fn load(conn: &Connection, collection: &str, id: &str) -> StoreResult<Option<Document>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            |row| row.get(0),
        )
        .optional()?;
    body.map(|b| serde_json::from_str::<Document>(&b).map_err(StoreError::from))
        .transpose()
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find_one(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        validate_collection(collection)?;
        let (collection, id) = (collection.to_string(), id.to_string());
        self.with_conn(move |conn| load(conn, &collection, &id)).await
    }

    async fn find(&self, collection: &str, filter: &Document) -> StoreResult<Vec<Document>> {
        validate_collection(collection)?;
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut stmt =
                conn.prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY id")?;
            let bodies = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

            let mut out = Vec::new();
            for body in bodies {
                let doc: Document = serde_json::from_str(&body?)?;
                if matches_filter(&doc, &filter) {
                    out.push(doc);
                }
            }
            Ok(out)
        })
        .await
    }

    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<()> {
        validate_collection(collection)?;
        let id = document_id(&doc)?;
        let body = serde_json::to_string(&doc)?;
        let collection = collection.to_string();
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
                params![collection, id, body],
            );
            match inserted {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::DuplicateId(id))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn update(&self, collection: &str, id: &str, update: Update) -> StoreResult<bool> {
        validate_collection(collection)?;
        let (collection, id) = (collection.to_string(), id.to_string());
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let Some(mut doc) = load(&tx, &collection, &id)? else {
                return Ok(false);
            };
            apply_update(&mut doc, &update);
            tx.execute(
                "UPDATE documents SET body = ?3 WHERE collection = ?1 AND id = ?2",
                params![collection, id, serde_json::to_string(&doc)?],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        validate_collection(collection)?;
        let (collection, id) = (collection.to_string(), id.to_string());
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )?;
            Ok(removed > 0)
        })
        .await
    }
}
