//! Configuration loader
//!
//! Loads application configuration from environment variables, falling back
//! to production defaults for anything unset.
//!
//! ## Environment Variables
//! - `BAKASYNC_TIMEZONE`: IANA time zone for wall-clock interpretation
//! - `BAKASYNC_CALENDAR_NAME`: emitted calendar name
//! - `BAKASYNC_CALENDAR_DESCRIPTION`: emitted calendar description
//! - `BAKASYNC_HTTP_TIMEOUT_SECS`: per-request timeout in seconds
//! - `BAKASYNC_USER_AGENT`: user agent sent to the school API
//! - `BAKASYNC_SQLITE_PATH`: SQLite vault path (unset keeps records in
//!   memory)

use bakasync_domain::{BakasyncError, Config, Result};

/// Load configuration, reading `.env` first when present.
///
/// # Errors
/// Returns `Config` if any set variable has an invalid value.
pub fn load() -> Result<Config> {
    dotenvy::dotenv().ok();
    load_from_env()
}

/// Load configuration from environment variables.
///
/// Unset variables keep their defaults; set-but-invalid values are errors,
/// never silently ignored.
///
/// # Errors
/// Returns `Config` for an unparseable timeout or an unknown time zone.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    if let Ok(timezone) = std::env::var("BAKASYNC_TIMEZONE") {
        timezone.parse::<chrono_tz::Tz>().map_err(|_| {
            BakasyncError::Config(format!("unknown time zone: {timezone}"))
        })?;
        config.sync.timezone = timezone;
    }

    if let Ok(name) = std::env::var("BAKASYNC_CALENDAR_NAME") {
        config.sync.calendar_name = name;
    }

    if let Ok(description) = std::env::var("BAKASYNC_CALENDAR_DESCRIPTION") {
        config.sync.calendar_description = description;
    }

    if let Ok(timeout) = std::env::var("BAKASYNC_HTTP_TIMEOUT_SECS") {
        config.http.timeout_seconds = timeout.parse::<u64>().map_err(|e| {
            BakasyncError::Config(format!("invalid HTTP timeout '{timeout}': {e}"))
        })?;
    }

    if let Ok(agent) = std::env::var("BAKASYNC_USER_AGENT") {
        config.http.user_agent = agent;
    }

    if let Ok(path) = std::env::var("BAKASYNC_SQLITE_PATH") {
        config.storage.sqlite_path = Some(path);
    }

    Ok(config)
}
