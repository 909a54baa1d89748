//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for bakasync
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BakasyncError {
    /// Vault record missing or expired in the backing store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Decryption tag verification failed, or the school API rejected the
    /// refresh grant after the single retry.
    #[error("Authentication failure: {0}")]
    AuthenticationFailure(String),

    /// Token rotation succeeded upstream but the rotated credential could not
    /// be persisted because the vault record disappeared.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Malformed or incomplete upstream payload.
    #[error("Fetch failure: {0}")]
    FetchFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for bakasync operations
pub type Result<T> = std::result::Result<T, BakasyncError>;
