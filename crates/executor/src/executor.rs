//! The Executor - single entry point from the gateway to the store.
//!
//! The Executor holds no per-request state. It reads the store handle from
//! the injected [`StoreConnection`] on every call, so a store that never
//! connected refuses every command without being contacted.

use std::sync::Arc;

use docgate_core::{Clock, SystemClock};
use docgate_storage::StoreConnection;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{Command, Error, Output, Result};

/// The command executor.
///
/// # Thread Safety
///
/// Executor is `Send + Sync`; one instance serves every connection.
///
/// # Example
///
/// ```ignore
/// use docgate_executor::{Command, Executor};
///
/// let executor = Executor::new(connection, "datasets");
/// let output = executor.execute(Command::from_payload(&json!({"get": "u1"}))?).await?;
/// ```
pub struct Executor {
    connection: Arc<StoreConnection>,
    default_collection: String,
    clock: Arc<dyn Clock>,
}

impl Executor {
    /// Create an executor over a store connection.
    pub fn new(connection: Arc<StoreConnection>, default_collection: impl Into<String>) -> Self {
        Self {
            connection,
            default_collection: default_collection.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Collection used when a command names none.
    pub fn default_collection(&self) -> &str {
        &self.default_collection
    }

    /// The injected connection.
    pub fn connection(&self) -> &Arc<StoreConnection> {
        &self.connection
    }

    /// Decode, validate and execute an untrusted payload.
    ///
    /// Refusals are logged and returned; the caller decides how to answer.
    /// Store failures log at warn, everything else at debug.
    pub async fn execute_payload(&self, payload: &Value) -> Result<Output> {
        let result = match Command::from_payload(payload) {
            Ok(cmd) => self.execute(cmd).await,
            Err(e) => Err(e),
        };
        match &result {
            Err(e @ (Error::Store { .. } | Error::InvalidDocument { .. })) => {
                warn!(code = e.reason_code(), error = %e, "Store operation failed");
            }
            Err(e) => debug!(code = e.reason_code(), error = %e, "Request refused"),
            Ok(_) => {}
        }
        result
    }

    /// Execute a single command.
    pub async fn execute(&self, cmd: Command) -> Result<Output> {
        let store = self.connection.handle().ok_or(Error::Unavailable)?;
        let collection = cmd
            .store()
            .unwrap_or(&self.default_collection)
            .to_string();

        match cmd {
            Command::Get { target, .. } => {
                crate::handlers::get::get(store.as_ref(), &collection, target).await
            }
            Command::Set { record, .. } => {
                crate::handlers::set::set(store.as_ref(), &collection, record, self.clock.as_ref())
                    .await
            }
            Command::Del { key, .. } => {
                crate::handlers::del::del(store.as_ref(), &collection, key).await
            }
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("connection", &self.connection)
            .field("default_collection", &self.default_collection)
            .finish()
    }
}
