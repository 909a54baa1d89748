//! Identity hashing and password-based key derivation.

use argon2::Argon2;
use bakasync_domain::{BakasyncError, RecordId, Result};
use sha2::{Digest, Sha256};

/// A 256-bit symmetric key. Redacted from debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Key([u8; 32]);

impl Key {
    /// Wrap raw key material.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Key").field(&"[REDACTED]").finish()
    }
}

/// Hash a caller identity string into its stable [`RecordId`].
///
/// Deterministic: the same identity always maps to the same record, which is
/// what lets a returning caller find their session without any lookup table.
#[must_use]
pub fn record_id(identity: &str) -> RecordId {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    RecordId::new(hex::encode(hasher.finalize()))
}

/// Derive the record encryption key from a caller secret and the RecordId.
///
/// Argon2id keeps brute-forcing the secret from a leaked record expensive.
/// The RecordId doubles as the salt, so the key is fully re-derivable and
/// never stored.
///
/// # Errors
/// Returns `Config` for an empty secret and `Internal` if the derivation
/// itself fails (invalid input lengths - programmer error).
pub fn derive_key(secret: &str, salt: &RecordId) -> Result<Key> {
    if secret.is_empty() {
        return Err(BakasyncError::Config("key derivation secret is empty".into()));
    }

    let argon2 = Argon2::default();
    let mut key = [0u8; 32];
    argon2
        .hash_password_into(secret.as_bytes(), salt.as_str().as_bytes(), &mut key)
        .map_err(|e| BakasyncError::Internal(format!("Key derivation failed: {e}")))?;

    Ok(Key(key))
}
