//! Expiring key-value store adapters
//!
//! Two backends behind the core [`ExpiringStore`](bakasync_core::ExpiringStore)
//! port: an in-memory map for tests and embedded callers, and a SQLite file
//! for anything that should survive a restart. Records reach both already
//! sealed by the vault, so neither backend adds encryption of its own.

use std::sync::Arc;

use bakasync_core::ExpiringStore;
use bakasync_domain::{Config, Result};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Pick the store adapter the configuration asks for.
///
/// # Errors
/// Returns `Storage` if the configured SQLite file cannot be opened.
pub fn store_from_config(config: &Config) -> Result<Arc<dyn ExpiringStore>> {
    match &config.storage.sqlite_path {
        Some(path) => Ok(Arc::new(SqliteStore::open(path)?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}
