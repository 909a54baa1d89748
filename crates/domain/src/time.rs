//! School-year time helpers
//!
//! Vault records live until the end of the school year (July 31), and the
//! calendar build windows are anchored to school weeks. Both rules live here
//! so the vault and the transformer agree on them.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};

use crate::constants::{SCHOOL_YEAR_END_DAY, SCHOOL_YEAR_END_MONTH};

/// The next July 31 boundary, as a UTC instant (midnight).
///
/// A record written on July 30 expires the next day; one written on July 31
/// or later rolls over to next year's boundary.
#[must_use]
pub fn next_school_year_end(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let this_year_end =
        NaiveDate::from_ymd_opt(today.year(), SCHOOL_YEAR_END_MONTH, SCHOOL_YEAR_END_DAY)
            .expect("July 31 exists in every year");

    let boundary = if today < this_year_end {
        this_year_end
    } else {
        NaiveDate::from_ymd_opt(today.year() + 1, SCHOOL_YEAR_END_MONTH, SCHOOL_YEAR_END_DAY)
            .expect("July 31 exists in every year")
    };

    Utc.from_utc_datetime(&boundary.and_hms_opt(0, 0, 0).expect("midnight exists"))
}

/// Seconds from `now` until the next July 31 boundary, floored at one second
/// so a record written moments before the boundary still lands in the store.
#[must_use]
pub fn school_year_ttl_seconds(now: DateTime<Utc>) -> u64 {
    let remaining = (next_school_year_end(now) - now).num_seconds();
    remaining.max(1) as u64
}

/// Roll a date falling on a weekend forward to the next Monday.
#[must_use]
pub fn roll_weekend_forward(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

/// Monday..Friday of the school week containing `window_start`.
#[must_use]
pub fn school_week_bounds(window_start: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday =
        window_start - Duration::days(i64::from(window_start.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(4))
}
