//! Bakaláři school API integration
//!
//! Typed client for the v3 API (login refresh, timetable, homeworks) and the
//! worker that turns timetable payloads into calendar events.

mod calendar;
mod client;
pub mod types;

pub use calendar::CalendarBuildWorker;
pub use client::BakalariClient;
