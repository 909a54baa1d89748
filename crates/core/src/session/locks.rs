//! Advisory refresh locks keyed by RecordId
//!
//! Two concurrent callers racing to refresh the same credential would both
//! rotate and then conflict at the vault's update step. The registry hands
//! out one async mutex per RecordId; `ensure_fresh` holds it for the whole
//! refresh, and the loser re-reads the vault instead of rotating again.

use std::sync::Arc;

use bakasync_domain::RecordId;
use dashmap::DashMap;
use tokio::sync::Mutex;

/// Process-wide registry of per-record refresh locks.
#[derive(Default)]
pub struct RefreshLockRegistry {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RefreshLockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `record_id`, created on first use.
    #[must_use]
    pub fn lock_for(&self, record_id: &RecordId) -> Arc<Mutex<()>> {
        self.locks
            .entry(record_id.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
