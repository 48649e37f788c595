//! Per-component apply serialization.
//!
//! Requests touching the same component id take turns from snapshot to
//! apply outcome, so a second start of an id sees the first one's result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Exclusive turn on one component id. Released on drop.
#[derive(Debug)]
pub struct ApplyPermit {
    _guard: OwnedMutexGuard<()>,
}

/// Queue of async locks keyed by component id.
#[derive(Debug, Default)]
pub struct ApplyQueue {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ApplyQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the turn on `id`.
    pub async fn acquire(&self, id: &str) -> ApplyPermit {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(id.to_string()).or_default())
        };
        let guard = slot.lock_owned().await;
        tracing::trace!(id, "apply turn acquired");
        ApplyPermit { _guard: guard }
    }
}
