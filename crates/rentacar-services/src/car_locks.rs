//! Per-car mutual exclusion
//!
//! Approve, reject and each reconciliation step read a car's state and then
//! write it back. Holding the car's lock across that sequence keeps two of
//! them from interleaving inside this process.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;
use uuid::Uuid;

/// Guard held for the duration of a car-scoped operation
pub type CarGuard = OwnedMutexGuard<()>;

/// Lock table keyed by car id
#[derive(Debug, Default)]
pub struct CarLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl CarLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `car_id`
    pub async fn acquire(&self, car_id: Uuid) -> CarGuard {
        let lock = {
            let mut locks = self.locks.lock();
            locks.entry(car_id).or_default().clone()
        };

        trace!(car_id = %car_id, "Waiting for car lock");
        lock.lock_owned().await
    }

    /// Drop entries that no task holds or waits on
    pub fn prune(&self) {
        self.locks.lock().retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of cars currently tracked
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}
