//! AES-256-GCM sealing with the fixed `iv‖tag‖ciphertext` record layout.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::password_hash::rand_core::{OsRng, RngCore};
use bakasync_domain::{BakasyncError, Result};

use super::keys::Key;

/// IV length in bytes (AES-GCM 96-bit nonce).
pub const IV_LEN: usize = 12;
/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Borrowed view over a sealed blob, split at the fixed offsets.
#[derive(Debug)]
pub struct SealedBlob<'a> {
    pub iv: &'a [u8],
    pub auth_tag: &'a [u8],
    pub ciphertext: &'a [u8],
}

impl<'a> SealedBlob<'a> {
    /// Split a stored blob into `iv` (12) ‖ `auth_tag` (16) ‖ `ciphertext`.
    ///
    /// # Errors
    /// Returns `AuthenticationFailure` for blobs too short to contain the
    /// fixed header - truncation is treated as tampering and fails closed.
    pub fn parse(blob: &'a [u8]) -> Result<Self> {
        if blob.len() < IV_LEN + TAG_LEN {
            return Err(BakasyncError::AuthenticationFailure(
                "sealed record is too short to contain iv and auth tag".into(),
            ));
        }

        let (iv, rest) = blob.split_at(IV_LEN);
        let (auth_tag, ciphertext) = rest.split_at(TAG_LEN);
        Ok(Self { iv, auth_tag, ciphertext })
    }
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
///
/// IVs are never reused: every call draws new random bytes, so re-sealing the
/// same plaintext produces a different blob.
///
/// # Errors
/// Returns `Internal` if cipher construction or encryption fails.
pub fn seal(key: &Key, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| BakasyncError::Internal(format!("Failed to create cipher: {e}")))?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    // aes-gcm appends the tag to the ciphertext; the stored layout wants it
    // between the iv and the ciphertext.
    let sealed = cipher
        .encrypt(&Nonce::from(iv), plaintext)
        .map_err(|e| BakasyncError::Internal(format!("Encryption failed: {e}")))?;
    let (ciphertext, auth_tag) = sealed.split_at(sealed.len() - TAG_LEN);

    let mut blob = Vec::with_capacity(IV_LEN + TAG_LEN + ciphertext.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(auth_tag);
    blob.extend_from_slice(ciphertext);
    Ok(blob)
}

/// Decrypt a sealed blob under `key`.
///
/// # Errors
/// Returns `AuthenticationFailure` if the blob is truncated or the tag does
/// not verify (wrong key or any tampered byte); no partial plaintext is ever
/// surfaced.
pub fn open(key: &Key, blob: &[u8]) -> Result<Vec<u8>> {
    let parts = SealedBlob::parse(blob)?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| BakasyncError::Internal(format!("Failed to create cipher: {e}")))?;

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(parts.iv);

    let mut data = Vec::with_capacity(parts.ciphertext.len() + TAG_LEN);
    data.extend_from_slice(parts.ciphertext);
    data.extend_from_slice(parts.auth_tag);

    cipher.decrypt(&Nonce::from(iv), data.as_ref()).map_err(|_| {
        BakasyncError::AuthenticationFailure(
            "sealed record failed tag verification (tampering or wrong key)".into(),
        )
    })
}
