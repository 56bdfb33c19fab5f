//! Document store backends and connection lifecycle
//!
//! - [`DocumentStore`]: the async operations the gateway needs from a store
//! - [`MemoryStore`] / [`SqliteStore`]: the two backends
//! - [`Connector`]: opens a backend, possibly failing
//! - [`StoreConnection`]: connect-with-one-retry, then hold or give up for good

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connection;
pub mod connector;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use connection::{ConnectionState, RetryPolicy, StoreConnection, CONNECT_ATTEMPTS};
pub use connector::{connector_for_url, Connector, MemoryConnector, SqliteConnector};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{apply_update, matches_filter, validate_collection, DocumentStore, Update};
