//! Core domain types
//!
//! Plain data types shared by the vault, the token lifecycle manager, and the
//! timetable transformer. Wire-format payload types for the school API live in
//! the infra crate; everything here is backend-agnostic.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::STORE_KEY_PREFIX;
use crate::errors::{BakasyncError, Result};

/// One school-API credential: refresh/access token pair plus expiry.
///
/// Owned exclusively by the token lifecycle manager while in memory; the
/// persisted (encrypted) form is owned by the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Base URL of the school instance (e.g. `https://school.example.cz`).
    pub endpoint_url: String,

    /// Bearer token presented to the timetable/homework endpoints.
    pub access_token: String,

    /// Long-lived token exchanged for fresh access tokens.
    pub refresh_token: String,

    /// Absolute expiry of `access_token` in epoch milliseconds.
    pub expires_at_epoch_ms: i64,
}

impl Credential {
    /// Check whether the access token is due for refresh.
    ///
    /// Due means `now` has passed the expiry minus the safety margin; callers
    /// never inspect expiry themselves beyond this predicate.
    #[must_use]
    pub fn is_due_for_refresh(&self, now_epoch_ms: i64, margin_ms: i64) -> bool {
        now_epoch_ms > self.expires_at_epoch_ms - margin_ms
    }

    /// Validate fields required for persistence.
    ///
    /// # Errors
    /// Returns `Config` if the refresh token is empty - a credential without
    /// one can never be rotated and must not enter the vault.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_token.is_empty() {
            return Err(BakasyncError::Config("credential refresh token is empty".into()));
        }
        Ok(())
    }
}

/// Stable identifier derived from a caller identity string.
///
/// Used both as the storage key suffix and as the salt for key derivation.
/// Deterministic for a given identity and never recomputed from anything
/// else. Construction lives in `bakasync-common::crypto`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an already-computed hex digest.
    #[must_use]
    pub fn new(hex_digest: String) -> Self {
        Self(hex_digest)
    }

    /// The raw hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full key under which the record is stored (`"bakalari:" + digest`).
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{STORE_KEY_PREFIX}{}", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One derived calendar event. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub description: String,
    pub location: String,
    /// Attachment URLs gathered from merged homework items.
    pub attachments: Vec<String>,
}

/// The emitted calendar object.
///
/// Collects events in insertion order; the serializer behind it (iCal or
/// otherwise) is a separate concern and only ever sees `create_event` calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub name: String,
    pub description: String,
    /// IANA time zone name the wall-clock times were interpreted in.
    pub timezone: String,
    events: Vec<CalendarEvent>,
}

impl Calendar {
    /// Create an empty calendar with the given metadata.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            timezone: timezone.into(),
            events: Vec::new(),
        }
    }

    /// Append an event. Ordering is the caller's; events are never re-sorted.
    pub fn create_event(&mut self, event: CalendarEvent) {
        self.events.push(event);
    }

    /// Events in insertion order.
    #[must_use]
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }
}
