//! Store connection lifecycle
//!
//! ```text
//! Unattempted ──connect()──> Connecting ──ok──────────────> Connected
//!                                │
//!                              error ── wait backoff ── retry ──ok──> Connected
//!                                                         │
//!                                                       error ──> Failed
//! ```
//!
//! `Failed` is terminal: there are no further attempts and every caller sees
//! the store as unavailable for the rest of the process. `Connected` is also
//! terminal; a connection that drops later is not re-established.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::connector::Connector;
use crate::store::DocumentStore;

/// Total connection attempts: the first one plus one retry.
pub const CONNECT_ATTEMPTS: u32 = 2;

/// Default wait between the two attempts.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(3000);

/// How long to wait before the retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait between attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Policy with the given backoff
    pub fn with_backoff(backoff: Duration) -> Self {
        Self { backoff }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

/// Where the connection is in its lifecycle
#[derive(Clone)]
pub enum ConnectionState {
    /// `connect` has not been called
    Unattempted,
    /// Attempts in progress
    Connecting,
    /// Holding a live store handle
    Connected(Arc<dyn DocumentStore>),
    /// Both attempts failed; permanently disabled
    Failed,
}

impl ConnectionState {
    /// State name, for logs
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Unattempted => "unattempted",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected(_) => "connected",
            ConnectionState::Failed => "failed",
        }
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owns the connection to the backing store.
///
/// Shared by every request handler; after `connect` completes the state is
/// only read.
pub struct StoreConnection {
    connector: Arc<dyn Connector>,
    policy: RetryPolicy,
    state: RwLock<ConnectionState>,
}

impl StoreConnection {
    /// Create an unattempted connection
    pub fn new(connector: Arc<dyn Connector>, policy: RetryPolicy) -> Self {
        Self {
            connector,
            policy,
            state: RwLock::new(ConnectionState::Unattempted),
        }
    }

    /// Run the connection attempts.
    ///
    /// Completes once the store is either connected or permanently failed;
    /// it never returns an error. The return value is `is_available()`.
    /// Only the first call attempts anything; later calls report the
    /// current state.
    pub async fn connect(&self) -> bool {
        {
            let mut state = self.state.write();
            if !matches!(*state, ConnectionState::Unattempted) {
                return matches!(*state, ConnectionState::Connected(_));
            }
            *state = ConnectionState::Connecting;
        }

        let target = self.connector.describe();
        for attempt in 1..=CONNECT_ATTEMPTS {
            match self.connector.connect().await {
                Ok(store) => {
                    info!(target = %target, attempt, "Connected to document store");
                    *self.state.write() = ConnectionState::Connected(store);
                    return true;
                }
                Err(e) => {
                    warn!(target = %target, attempt, error = %e, "Document store connection failed");
                    if attempt < CONNECT_ATTEMPTS {
                        tokio::time::sleep(self.policy.backoff).await;
                    }
                }
            }
        }

        warn!(target = %target, "Document store unavailable, data operations are disabled");
        *self.state.write() = ConnectionState::Failed;
        false
    }

    /// True once connected
    pub fn is_available(&self) -> bool {
        matches!(*self.state.read(), ConnectionState::Connected(_))
    }

    /// The live store handle, if connected
    pub fn handle(&self) -> Option<Arc<dyn DocumentStore>> {
        match &*self.state.read() {
            ConnectionState::Connected(store) => Some(Arc::clone(store)),
            _ => None,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ConnectionState {
        self.state.read().clone()
    }
}

impl fmt::Debug for StoreConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConnection")
            .field("target", &self.connector.describe())
            .field("policy", &self.policy)
            .field("state", &*self.state.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use crate::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` attempts, then hands out a memory store.
    struct FlakyConnector {
        failures: u32,
        attempts: AtomicU32,
    }

    impl FlakyConnector {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                attempts: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Connector for FlakyConnector {
        async fn connect(&self) -> StoreResult<Arc<dyn DocumentStore>> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(StoreError::Connection("refused".into()));
            }
            let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
            Ok(store)
        }

        fn describe(&self) -> String {
            "flaky".into()
        }
    }

    fn fast() -> RetryPolicy {
        RetryPolicy::with_backoff(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_first_attempt_succeeds() {
        let connector = Arc::new(FlakyConnector::new(0));
        let conn = StoreConnection::new(connector.clone(), fast());
        assert!(matches!(conn.state(), ConnectionState::Unattempted));
        assert!(conn.handle().is_none());

        assert!(conn.connect().await);
        assert!(conn.is_available());
        assert!(conn.handle().is_some());
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_once_then_succeed() {
        let connector = Arc::new(FlakyConnector::new(1));
        let conn = StoreConnection::new(connector.clone(), fast());
        assert!(conn.connect().await);
        assert!(conn.is_available());
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_two_failures_disable_permanently() {
        let connector = Arc::new(FlakyConnector::new(2));
        let conn = StoreConnection::new(connector.clone(), fast());
        assert!(!conn.connect().await);
        assert!(matches!(conn.state(), ConnectionState::Failed));
        assert!(conn.handle().is_none());

        // The connector would succeed now, but a failed connection stays failed.
        assert!(!conn.connect().await);
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_backoff_is_observed() {
        let connector = Arc::new(FlakyConnector::new(1));
        let conn = StoreConnection::new(
            connector,
            RetryPolicy::with_backoff(Duration::from_millis(40)),
        );
        let started = std::time::Instant::now();
        assert!(conn.connect().await);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let connector = Arc::new(FlakyConnector::new(0));
        let conn = StoreConnection::new(connector.clone(), fast());
        assert!(conn.connect().await);
        assert!(conn.connect().await);
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(RetryPolicy::default().backoff, Duration::from_millis(3000));
        assert_eq!(format!("{:?}", ConnectionState::Failed), "failed");
    }
}
