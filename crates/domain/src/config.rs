//! Application configuration structures
//!
//! Loaded from environment variables by the infra crate; every field has a
//! production default so a bare environment still works.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALENDAR_DESCRIPTION, DEFAULT_CALENDAR_NAME, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_TIMEZONE, DEFAULT_USER_AGENT,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub sync: SyncSettings,
    pub http: HttpSettings,
    pub storage: StorageSettings,
}

/// Calendar build settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// IANA time zone the school's wall-clock times are interpreted in.
    pub timezone: String,
    pub calendar_name: String,
    pub calendar_description: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            calendar_name: DEFAULT_CALENDAR_NAME.to_string(),
            calendar_description: DEFAULT_CALENDAR_DESCRIPTION.to_string(),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Bounded per-request timeout; a hung transport must never block the
    /// process indefinitely.
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Vault storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Path of the SQLite vault store; `None` keeps records in memory only.
    pub sqlite_path: Option<String>,
}

#[cfg(test)]
mod tests {
    //! Unit tests for config.
    use super::*;

    /// Validates `Config::default` behavior for the production defaults
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the default time zone and timeout match the documented
    ///   constants.
    #[test]
    fn defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.sync.timezone, "Europe/Prague");
        assert_eq!(config.http.timeout_seconds, 30);
        assert!(!config.http.user_agent.is_empty());
    }
}
