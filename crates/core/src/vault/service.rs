//! Credential vault service
//!
//! Owns the encrypted persisted form of a credential. Plaintext credentials
//! only ever exist in memory; everything that reaches the store has been
//! sealed under a key derived from the caller's secret.

use std::sync::Arc;

use bakasync_common::crypto::{self, Key};
use bakasync_domain::time::school_year_ttl_seconds;
use bakasync_domain::{BakasyncError, Credential, RecordId, Result};
use chrono::Utc;
use tracing::{debug, info};

use super::ports::ExpiringStore;

/// Result of [`CredentialVault::create`].
#[derive(Debug)]
pub struct CreateOutcome {
    pub record_id: RecordId,
    /// True when a record for this identity already existed; the stored
    /// record is left untouched in that case.
    pub already_existed: bool,
    /// Key derived from the supplied secret. Returned in both cases so a
    /// returning caller can recover an existing session without a second
    /// derivation.
    pub key: Key,
}

/// Encrypted-at-rest credential storage over an [`ExpiringStore`].
pub struct CredentialVault {
    store: Arc<dyn ExpiringStore>,
}

impl CredentialVault {
    /// Create a vault backed by the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ExpiringStore>) -> Self {
        Self { store }
    }

    /// Create the record for `identity`, unless one already exists.
    ///
    /// The RecordId is computed from the identity string and the key from
    /// `(secret, RecordId)`. If a record is already present nothing is
    /// written - the caller gets `already_existed = true` plus the derived
    /// key and can [`read`](Self::read) the stored credential. A fresh record
    /// is sealed with a new random IV and stored with a TTL ending at the
    /// next July 31 boundary.
    ///
    /// # Errors
    /// Returns `Config` if the credential's refresh token is empty, or a
    /// storage/crypto error.
    pub async fn create(
        &self,
        identity: &str,
        credential: &Credential,
        secret: &str,
    ) -> Result<CreateOutcome> {
        credential.validate()?;

        let record_id = crypto::record_id(identity);
        let key = crypto::derive_key(secret, &record_id)?;
        let storage_key = record_id.storage_key();

        if self.store.exists(&storage_key).await? {
            debug!(record_id = %record_id, "credential record already exists, returning key only");
            return Ok(CreateOutcome { record_id, already_existed: true, key });
        }

        let blob = self.seal_credential(credential, &key)?;
        let ttl = school_year_ttl_seconds(Utc::now());
        self.store.set(&storage_key, blob, ttl).await?;

        info!(record_id = %record_id, ttl_seconds = ttl, "credential record created");
        Ok(CreateOutcome { record_id, already_existed: false, key })
    }

    /// Load and decrypt the record for `record_id`.
    ///
    /// # Errors
    /// Returns `NotFound` if the record is absent or expired, and
    /// `AuthenticationFailure` if the blob fails tag verification (tampering
    /// or wrong key). No partial plaintext is ever surfaced.
    pub async fn read(&self, record_id: &RecordId, key: &Key) -> Result<Credential> {
        let blob = self.store.get(&record_id.storage_key()).await?.ok_or_else(|| {
            BakasyncError::NotFound(format!("credential record {record_id} is missing or expired"))
        })?;

        let plaintext = crypto::open(key, &blob)?;
        serde_json::from_slice(&plaintext).map_err(|e| {
            BakasyncError::Internal(format!("stored credential is not valid JSON: {e}"))
        })
    }

    /// Overwrite the record for `record_id` with a re-sealed credential.
    ///
    /// A fresh random IV is drawn (IVs are never reused) and the TTL resets
    /// to the current next-July-31 boundary.
    ///
    /// # Errors
    /// Returns `NotFound` if the record was deleted or expired since the last
    /// read - the caller's session must restart from a fresh
    /// [`create`](Self::create).
    pub async fn update(
        &self,
        record_id: &RecordId,
        credential: &Credential,
        key: &Key,
    ) -> Result<()> {
        credential.validate()?;

        let storage_key = record_id.storage_key();
        if !self.store.exists(&storage_key).await? {
            return Err(BakasyncError::NotFound(format!(
                "credential record {record_id} disappeared before update"
            )));
        }

        let blob = self.seal_credential(credential, key)?;
        let ttl = school_year_ttl_seconds(Utc::now());
        self.store.set(&storage_key, blob, ttl).await?;

        debug!(record_id = %record_id, "credential record re-encrypted");
        Ok(())
    }

    /// Remove the record for `record_id`. Idempotent.
    ///
    /// # Errors
    /// Returns a storage error from the backend; a missing record is not an
    /// error and reports `false`.
    pub async fn delete(&self, record_id: &RecordId) -> Result<bool> {
        let existed = self.store.delete(&record_id.storage_key()).await?;
        if existed {
            info!(record_id = %record_id, "credential record revoked");
        }
        Ok(existed)
    }

    fn seal_credential(&self, credential: &Credential, key: &Key) -> Result<Vec<u8>> {
        let plaintext = serde_json::to_vec(credential).map_err(|e| {
            BakasyncError::Internal(format!("failed to serialize credential: {e}"))
        })?;
        crypto::seal(key, &plaintext)
    }
}
