//! # Bakasync Infra
//!
//! Infrastructure adapters behind the core ports.
//!
//! This crate contains:
//! - The reqwest-based HTTP client with bounded timeouts
//! - The Bakaláři API client (login refresh, timetable, homeworks)
//! - The timetable-to-calendar build worker
//! - Expiring key-value store adapters (in-memory and SQLite)
//! - Configuration loading and infra→domain error conversions

pub mod bakalari;
pub mod config;
pub mod errors;
pub mod http;
pub mod store;

pub use bakalari::{BakalariClient, CalendarBuildWorker};
pub use errors::InfraError;
pub use http::HttpClient;
pub use store::{store_from_config, MemoryStore, SqliteStore};
