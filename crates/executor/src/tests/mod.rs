//! Test modules for the executor crate.

pub mod dispatch;
pub mod upsert;

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use docgate_core::Clock;
use docgate_storage::{MemoryConnector, MemoryStore, RetryPolicy, StoreConnection};
use parking_lot::Mutex;

use crate::Executor;

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        *self.now.lock() += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Executor over a connected, empty memory store.
pub async fn create_test_executor() -> (Executor, Arc<MemoryStore>, Arc<ManualClock>) {
    let store = Arc::new(MemoryStore::new());
    let connection = Arc::new(StoreConnection::new(
        Arc::new(MemoryConnector::with_store(store.clone())),
        RetryPolicy::default(),
    ));
    assert!(connection.connect().await);

    let clock = Arc::new(ManualClock::new());
    let executor = Executor::new(connection, "datasets").with_clock(clock.clone());
    (executor, store, clock)
}
