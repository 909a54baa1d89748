//! Credential vault
//!
//! Encrypted-at-rest storage of one credential record per identity, built on
//! a generic expiring key-value store. The encryption key is derived from the
//! caller's secret and the RecordId, never persisted.

pub mod ports;
mod service;

pub use service::{CreateOutcome, CredentialVault};
