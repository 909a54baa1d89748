//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// School API protocol constants
pub const API_CLIENT_ID: &str = "ANDR";
pub const API_LOGIN_PATH: &str = "/api/login";
pub const API_TIMETABLE_PATH: &str = "/api/3/timetable/actual";
pub const API_HOMEWORKS_PATH: &str = "/api/3/homeworks";

// Token lifecycle configuration
pub const REFRESH_SAFETY_MARGIN_MS: i64 = 60_000;
pub const REFRESH_RETRY_DELAY_MS: u64 = 100;

// Vault storage configuration
pub const STORE_KEY_PREFIX: &str = "bakalari:";
pub const SCHOOL_YEAR_END_MONTH: u32 = 7;
pub const SCHOOL_YEAR_END_DAY: u32 = 31;

// Calendar defaults
pub const DEFAULT_TIMEZONE: &str = "Europe/Prague";
pub const DEFAULT_CALENDAR_NAME: &str = "Bakaláři iCal sink";
pub const DEFAULT_CALENDAR_DESCRIPTION: &str = "Timetable events synced from Bakaláři";
pub const UNKNOWN_TEACHER_PLACEHOLDER: &str = "???";
pub const UNKNOWN_ROOM_PLACEHOLDER: &str = "???";
pub const UNKNOWN_LOCATION_PLACEHOLDER: &str = "Unknown location";

// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.6831.68 Safari/537.36";
