//! Cryptographic primitives for credential sealing.
//!
//! This module provides the **low-level primitives** the vault is built on:
//!
//! - [`record_id`]: stable identity hashing (SHA-256 hex digest)
//! - [`derive_key`]: password-based key derivation using Argon2id
//! - [`seal`]/[`open`]: AES-256-GCM with the `iv‖tag‖ciphertext` blob layout
//!
//! The encryption key is never persisted anywhere - it is re-derivable from
//! the caller's secret plus the stored RecordId, which is the system's core
//! trust boundary. Higher-level record management lives in
//! `bakasync-core::vault`.

mod keys;
mod sealed;

pub use keys::{derive_key, record_id, Key};
pub use sealed::{open, seal, SealedBlob, IV_LEN, TAG_LEN};
