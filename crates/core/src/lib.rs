//! # Bakasync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The credential vault (encrypted-at-rest record management)
//! - The token lifecycle manager ([`session::CredentialSession`])
//! - Port/adapter interfaces (traits) for storage and transport
//!
//! ## Architecture Principles
//! - Only depends on `bakasync-common` and `bakasync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod session;
pub mod vault;

// Re-export specific items to avoid ambiguity
pub use session::locks::RefreshLockRegistry;
pub use session::ports::{RefreshReply, RefreshTransport, TokenGrant};
pub use session::CredentialSession;
pub use vault::ports::ExpiringStore;
pub use vault::{CreateOutcome, CredentialVault};
