//! Token lifecycle manager
//!
//! Manages one credential's lifecycle:
//! - Refresh-when-due with a 60-second safety margin
//! - One-shot retry after a transient 401, 100 ms apart
//! - Rotation persisted through the vault before callers see the new token
//! - Per-record advisory lock plus re-read reconciliation for racing callers

use std::sync::Arc;

use bakasync_common::crypto::{self, Key};
use bakasync_domain::constants::{REFRESH_RETRY_DELAY_MS, REFRESH_SAFETY_MARGIN_MS};
use bakasync_domain::{BakasyncError, Credential, RecordId, Result};
use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use super::locks::RefreshLockRegistry;
use super::ports::{RefreshReply, RefreshTransport, TokenGrant};
use crate::vault::CredentialVault;

/// One logical session owning a live credential.
///
/// The credential never leaks into process-wide state; everything callers
/// need goes through this object. `ensure_fresh` is safe to call before every
/// remote operation - callers never inspect expiry themselves.
pub struct CredentialSession {
    vault: Arc<CredentialVault>,
    transport: Arc<dyn RefreshTransport>,
    locks: Arc<RefreshLockRegistry>,
    record_id: RecordId,
    key: Key,
    credential: RwLock<Credential>,
}

impl CredentialSession {
    /// Create a session, persisting the credential if this identity is new.
    ///
    /// When a record for the identity already exists the supplied credential
    /// is discarded and the stored one is decrypted with the derived key
    /// instead, so a returning caller rejoins their session.
    ///
    /// # Errors
    /// Propagates vault errors; `Config` for an empty refresh token.
    pub async fn create(
        vault: Arc<CredentialVault>,
        transport: Arc<dyn RefreshTransport>,
        locks: Arc<RefreshLockRegistry>,
        identity: &str,
        credential: Credential,
        secret: &str,
    ) -> Result<(Self, bool)> {
        let outcome = vault.create(identity, &credential, secret).await?;

        let live = if outcome.already_existed {
            vault.read(&outcome.record_id, &outcome.key).await?
        } else {
            credential
        };

        let session = Self {
            vault,
            transport,
            locks,
            record_id: outcome.record_id,
            key: outcome.key,
            credential: RwLock::new(live),
        };
        Ok((session, outcome.already_existed))
    }

    /// Resume a session from an existing vault record.
    ///
    /// # Errors
    /// Returns `NotFound` if no record exists for the identity (or it
    /// expired) and `AuthenticationFailure` for a wrong secret.
    pub async fn resume(
        vault: Arc<CredentialVault>,
        transport: Arc<dyn RefreshTransport>,
        locks: Arc<RefreshLockRegistry>,
        identity: &str,
        secret: &str,
    ) -> Result<Self> {
        let record_id = crypto::record_id(identity);
        let key = crypto::derive_key(secret, &record_id)?;
        let credential = vault.read(&record_id, &key).await?;

        Ok(Self { vault, transport, locks, record_id, key, credential: RwLock::new(credential) })
    }

    /// Refresh the access token if it is due, otherwise no-op.
    ///
    /// Due means now has passed `expires_at - 60 s`. The whole refresh runs
    /// under the per-record advisory lock; a caller that lost the race to a
    /// concurrent refresher adopts the winner's tokens from the vault instead
    /// of rotating again.
    ///
    /// # Errors
    /// - `Network` when the transport fails outright
    /// - `AuthenticationFailure` when the server rejects the grant after the
    ///   single retry
    /// - `SessionExpired` when rotation succeeded upstream but the vault
    ///   record disappeared before it could be persisted
    pub async fn ensure_fresh(&self) -> Result<()> {
        let now_ms = Utc::now().timestamp_millis();
        if !self
            .credential
            .read()
            .await
            .is_due_for_refresh(now_ms, REFRESH_SAFETY_MARGIN_MS)
        {
            return Ok(());
        }

        let lock = self.locks.lock_for(&self.record_id);
        let _guard = lock.lock().await;

        // Re-check under the lock: a concurrent caller may have finished the
        // rotation while we waited.
        let now_ms = Utc::now().timestamp_millis();
        match self.vault.read(&self.record_id, &self.key).await {
            Ok(stored) => {
                if !stored.is_due_for_refresh(now_ms, REFRESH_SAFETY_MARGIN_MS) {
                    debug!(record_id = %self.record_id, "adopting concurrently rotated credential");
                    *self.credential.write().await = stored;
                    return Ok(());
                }
            }
            // Missing record: let the refresh run; persisting it will surface
            // SessionExpired with the full context.
            Err(BakasyncError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        self.refresh_locked(now_ms).await
    }

    /// Current bearer token. Call [`ensure_fresh`](Self::ensure_fresh) first.
    pub async fn access_token(&self) -> String {
        self.credential.read().await.access_token.clone()
    }

    /// Snapshot of the live credential.
    pub async fn credential(&self) -> Credential {
        self.credential.read().await.clone()
    }

    /// The session's vault RecordId.
    #[must_use]
    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    /// Delete the vault record and drop the in-memory credential.
    ///
    /// # Errors
    /// Returns a storage error from the backend; reports whether a record
    /// existed.
    pub async fn revoke(self) -> Result<bool> {
        self.vault.delete(&self.record_id).await
    }

    async fn refresh_locked(&self, now_ms: i64) -> Result<()> {
        let (endpoint_url, refresh_token) = {
            let credential = self.credential.read().await;
            (credential.endpoint_url.clone(), credential.refresh_token.clone())
        };

        let mut reply = self.transport.request_refresh(&endpoint_url, &refresh_token).await?;
        if reply.is_unauthorized() {
            debug!(record_id = %self.record_id, "refresh unauthorized, retrying once");
            sleep(Duration::from_millis(REFRESH_RETRY_DELAY_MS)).await;
            reply = self.transport.request_refresh(&endpoint_url, &refresh_token).await?;
        }

        let grant = grant_from_reply(reply)?;
        let rotated = Credential {
            endpoint_url,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at_epoch_ms: now_ms + grant.expires_in * 1000,
        };

        match self.vault.update(&self.record_id, &rotated, &self.key).await {
            Ok(()) => {}
            Err(BakasyncError::NotFound(_)) => {
                return Err(BakasyncError::SessionExpired(format!(
                    "vault record {} disappeared while persisting rotated tokens",
                    self.record_id
                )));
            }
            Err(e) => return Err(e),
        }

        *self.credential.write().await = rotated;
        info!(record_id = %self.record_id, "access token rotated");
        Ok(())
    }
}

/// Evaluate the final reply of the refresh protocol.
fn grant_from_reply(reply: RefreshReply) -> Result<TokenGrant> {
    if reply.error.is_some() || !reply.is_success() {
        let description = reply
            .error_description
            .or(reply.error)
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(BakasyncError::AuthenticationFailure(format!(
            "Failed to refresh token: {description}"
        )));
    }

    reply.grant.ok_or_else(|| {
        BakasyncError::AuthenticationFailure(
            "Failed to refresh token: response is missing token fields".into(),
        )
    })
}
