//! Wall-clock sampling for the app.
//!
//! Only this module reads the browser clock; state and stats code takes
//! explicit instants so it stays pure and testable off-browser. Dates are
//! local wall-clock dates, not UTC: a 23:30 feeding belongs to the local
//! calendar day it happened on.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use js_sys::Date;

/// Current epoch milliseconds.
pub fn now_millis() -> i64 {
    Date::now() as i64
}

/// Today's local calendar date as "YYYY-MM-DD".
pub fn today_string() -> String {
    let now = Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date()
    )
}

/// Current local time of day as "HH:MM" (24-hour).
pub fn current_display_time() -> String {
    let now = Date::new_0();
    format!("{:02}:{:02}", now.get_hours(), now.get_minutes())
}

/// Current local wall-clock instant, for the derived time-since views.
pub fn now_local() -> NaiveDateTime {
    let now = Date::new_0();
    let date = NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .unwrap_or_default();
    let time = NaiveTime::from_hms_opt(now.get_hours(), now.get_minutes(), now.get_seconds())
        .unwrap_or_default();
    NaiveDateTime::new(date, time)
}

/// Shift a "YYYY-MM-DD" date by whole days (day navigator).
pub fn shift_date(date_string: &str, days: i64) -> Option<String> {
    let date = NaiveDate::parse_from_str(date_string, "%Y-%m-%d").ok()?;
    let shifted = date.checked_add_signed(Duration::days(days))?;
    Some(shifted.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_date() {
        assert_eq!(shift_date("2024-01-10", -1).as_deref(), Some("2024-01-09"));
        assert_eq!(shift_date("2024-01-10", 1).as_deref(), Some("2024-01-11"));
        // Month and year boundaries.
        assert_eq!(shift_date("2024-03-01", -1).as_deref(), Some("2024-02-29"));
        assert_eq!(shift_date("2023-12-31", 1).as_deref(), Some("2024-01-01"));
        assert_eq!(shift_date("not-a-date", 1), None);
    }
}
