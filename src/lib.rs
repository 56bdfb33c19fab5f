//! docgate - HTTP data gateway over a document store
//!
//! Requests name one operation (`get`, `set` or `del`) and optionally a
//! collection (`store`). The gateway validates them, maps dataset keys onto
//! store identifiers and answers with JSON.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use docgate::{Executor, MemoryConnector, RetryPolicy, StoreConnection};
//! use serde_json::json;
//!
//! let connection = Arc::new(StoreConnection::new(
//!     Arc::new(MemoryConnector::new()),
//!     RetryPolicy::default(),
//! ));
//! connection.connect().await;
//!
//! let executor = Executor::new(connection, "datasets");
//! executor.execute_payload(&json!({"set": {"key": "u1", "name": "Ann"}})).await?;
//! let record = executor.execute_payload(&json!({"get": "u1"})).await?;
//! ```
//!
//! # Architecture
//!
//! | Crate | Role |
//! |-------|------|
//! | `docgate-core` | dataset keys, record/document codec, timestamps |
//! | `docgate-storage` | store trait, memory and SQLite backends, connection lifecycle |
//! | `docgate-executor` | request validation and operation dispatch |
//! | `docgate-server` | HTTP framing, query strings, configuration, binary |

pub use docgate_executor::*;
pub use docgate_server::{Gateway, GatewayConfig};
pub use docgate_storage::{
    connector_for_url, Connector, DocumentStore, MemoryConnector, MemoryStore, RetryPolicy,
    SqliteConnector, SqliteStore, StoreConnection,
};
