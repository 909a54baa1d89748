//! Mock port implementations for testing
//!
//! Provides in-memory mocks for the storage and transport ports, enabling
//! deterministic unit tests without a database or network.
#![allow(dead_code)] // each test binary uses a different subset

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bakasync_core::{ExpiringStore, RefreshReply, RefreshTransport, TokenGrant};
use bakasync_domain::{BakasyncError, Credential, Result as DomainResult};

/// In-memory mock for [`ExpiringStore`].
///
/// Stores live values plus the last TTL written per key so tests can assert
/// on expiry policy without waiting for wall-clock time.
#[derive(Default)]
pub struct MockStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    ttls: Mutex<HashMap<String, u64>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The TTL most recently written for `key`, if any.
    pub fn last_ttl(&self, key: &str) -> Option<u64> {
        self.ttls.lock().unwrap().get(key).copied()
    }

    /// Raw stored blob for `key`, if any.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Overwrite the raw blob for `key` (tampering helper).
    pub fn poke(&self, key: &str, value: Vec<u8>) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    /// Drop `key` out from under the vault (simulated store expiry).
    pub fn evict(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

#[async_trait]
impl ExpiringStore for MockStore {
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> DomainResult<()> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        self.ttls.lock().unwrap().insert(key.to_string(), ttl_seconds);
        Ok(())
    }

    async fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn exists(&self, key: &str) -> DomainResult<bool> {
        Ok(self.entries.lock().unwrap().contains_key(key))
    }

    async fn delete(&self, key: &str) -> DomainResult<bool> {
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }
}

/// Scripted mock for [`RefreshTransport`].
///
/// Pops one queued reply per wire call and records the call parameters;
/// calling past the end of the script is an error so over-calling tests fail
/// loudly.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<RefreshReply>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, String)>>,
}

impl MockTransport {
    pub fn scripted(replies: Vec<RefreshReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(endpoint_url, refresh_token)` pairs in call order.
    pub fn seen(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl RefreshTransport for MockTransport {
    async fn request_refresh(
        &self,
        endpoint_url: &str,
        refresh_token: &str,
    ) -> DomainResult<RefreshReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((endpoint_url.to_string(), refresh_token.to_string()));

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BakasyncError::Network("unexpected refresh request".into()))
    }
}

/// A 2xx reply carrying a fresh token grant.
pub fn reply_success(suffix: &str) -> RefreshReply {
    RefreshReply {
        status: 200,
        grant: Some(TokenGrant {
            access_token: format!("access-{suffix}"),
            refresh_token: format!("refresh-{suffix}"),
            expires_in: 3600,
        }),
        error: None,
        error_description: None,
    }
}

/// A bare 401 reply (stale token).
pub fn reply_unauthorized() -> RefreshReply {
    RefreshReply {
        status: 401,
        grant: None,
        error: Some("invalid_grant".to_string()),
        error_description: Some("Refresh token has expired".to_string()),
    }
}

/// A credential expiring `offset_ms` from now.
pub fn credential_expiring_in(offset_ms: i64) -> Credential {
    Credential {
        endpoint_url: "https://school.example.cz".to_string(),
        access_token: "stale-access".to_string(),
        refresh_token: "stale-refresh".to_string(),
        expires_at_epoch_ms: chrono::Utc::now().timestamp_millis() + offset_ms,
    }
}
