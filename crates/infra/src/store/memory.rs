//! In-memory expiring store

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bakasync_core::ExpiringStore;
use bakasync_domain::Result;
use parking_lot::RwLock;

struct StoredValue {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Thread-safe in-memory [`ExpiringStore`].
///
/// Expiry is checked on every access and expired entries are removed on the
/// spot, so a reader can never observe a value past its TTL.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries (expired ones are not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().values().filter(|entry| entry.expires_at > now).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a live entry, removing it if its TTL has passed.
    fn take_live(&self, key: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl ExpiringStore for MemoryStore {
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_seconds);
        self.entries.write().insert(key.to_string(), StoredValue { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.take_live(key))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.take_live(key).is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write();
        match entries.remove(key) {
            Some(entry) => Ok(entry.expires_at > Instant::now()),
            None => Ok(false),
        }
    }
}
