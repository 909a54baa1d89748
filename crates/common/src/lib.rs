//! # Bakasync Common
//!
//! Cryptographic primitives shared by the higher layers.
//!
//! This crate contains:
//! - RecordId derivation (SHA-256 over a caller identity string)
//! - Password-based key derivation (Argon2id, salted with the RecordId)
//! - AES-256-GCM sealing/opening with the `iv‖tag‖ciphertext` blob layout
//!
//! ## Architecture
//! - Depends only on `bakasync-domain`
//! - Pure functions, no I/O; keys never leave the process

pub mod crypto;

pub use crypto::{derive_key, open, record_id, seal, Key, SealedBlob};
