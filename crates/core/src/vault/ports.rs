//! Port interfaces for vault storage

use async_trait::async_trait;
use bakasync_domain::Result;

/// Trait for an expiring key-value store.
///
/// Any backend satisfying this contract works; records carry their own TTL
/// and the store (not the application) enforces expiry: a `get` after the TTL
/// must report the key as absent.
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Store `value` under `key` with a time-to-live in seconds, overwriting
    /// any existing value and resetting its TTL.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<()>;

    /// Fetch the value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Whether a live (non-expired) value exists for `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remove `key`. Returns whether a live value existed. Idempotent.
    async fn delete(&self, key: &str) -> Result<bool>;
}
