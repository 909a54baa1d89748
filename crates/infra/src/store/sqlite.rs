//! SQLite-backed expiring store

use std::path::Path;

use async_trait::async_trait;
use bakasync_core::ExpiringStore;
use bakasync_domain::Result;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::errors::InfraError;

/// File-backed [`ExpiringStore`] on a single SQLite connection.
///
/// Rows carry an absolute `expires_at` (epoch seconds); reads filter expired
/// rows out and every write opportunistically purges them, so expiry is
/// enforced by the store rather than its callers. Operations are short
/// single-row statements, serialized behind one mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    /// Returns `Storage` if the database cannot be opened or migrated.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path).map_err(InfraError::from)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory store (handy for tests).
    ///
    /// # Errors
    /// Returns `Storage` if the database cannot be opened or migrated.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(InfraError::from)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS vault_records (
                 key        TEXT PRIMARY KEY,
                 value      BLOB NOT NULL,
                 expires_at INTEGER NOT NULL
             );",
        )
        .map_err(InfraError::from)?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    fn now_epoch() -> i64 {
        Utc::now().timestamp()
    }
}

#[async_trait]
impl ExpiringStore for SqliteStore {
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<()> {
        let now = Self::now_epoch();
        let expires_at = now.saturating_add(i64::try_from(ttl_seconds).unwrap_or(i64::MAX));

        let conn = self.conn.lock();
        let purged = conn
            .execute("DELETE FROM vault_records WHERE expires_at <= ?1", [now])
            .map_err(InfraError::from)?;
        if purged > 0 {
            debug!(purged, "purged expired vault records");
        }

        conn.execute(
            "INSERT OR REPLACE INTO vault_records (key, value, expires_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, expires_at],
        )
        .map_err(InfraError::from)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value FROM vault_records WHERE key = ?1 AND expires_at > ?2",
            rusqlite::params![key, Self::now_epoch()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| InfraError::from(e).into())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM vault_records WHERE key = ?1 AND expires_at > ?2)",
            rusqlite::params![key, Self::now_epoch()],
            |row| row.get(0),
        )
        .map_err(|e| InfraError::from(e).into())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Self::now_epoch();
        let conn = self.conn.lock();

        let was_live: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM vault_records WHERE key = ?1 AND expires_at > ?2)",
                rusqlite::params![key, now],
                |row| row.get(0),
            )
            .map_err(InfraError::from)?;

        conn.execute("DELETE FROM vault_records WHERE key = ?1", [key])
            .map_err(InfraError::from)?;
        Ok(was_live)
    }
}
