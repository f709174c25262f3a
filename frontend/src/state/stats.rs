//! Derived views over the record list. All pure: the current instant and
//! date come in as parameters, never from ambient clock state.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use shared::{display_time_minutes, FeedingRecord};
use std::collections::BTreeMap;
use std::fmt;

/// Number of days covered by the trend view, today included.
pub const TREND_DAYS: usize = 15;

/// Total volume logged on one date.
pub fn day_total(records: &[FeedingRecord], date_string: &str) -> f64 {
    records_for_day(records, date_string)
        .map(|record| record.amount)
        .sum()
}

/// Number of feedings logged on one date.
pub fn day_count(records: &[FeedingRecord], date_string: &str) -> usize {
    records_for_day(records, date_string).count()
}

fn records_for_day<'a>(
    records: &'a [FeedingRecord],
    date_string: &'a str,
) -> impl Iterator<Item = &'a FeedingRecord> {
    records
        .iter()
        .filter(move |record| record.date_string.as_deref() == Some(date_string))
}

/// What can be said about the time elapsed since the most recent feeding.
/// Each failure mode gets its own readable fallback instead of a crash.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeSinceFeed {
    NoRecords,
    MissingFields,
    Unparsable,
    InFuture,
    Elapsed { hours: i64, minutes: i64 },
}

impl fmt::Display for TimeSinceFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSinceFeed::NoRecords => write!(f, "No feeds recorded yet"),
            TimeSinceFeed::MissingFields => write!(f, "Last feed time unknown"),
            TimeSinceFeed::Unparsable => write!(f, "Last feed time unreadable"),
            TimeSinceFeed::InFuture => write!(f, "Last feed is in the future"),
            TimeSinceFeed::Elapsed { hours: 0, minutes } => {
                write!(f, "{}m since last feed", minutes)
            }
            TimeSinceFeed::Elapsed { hours, minutes } => {
                write!(f, "{}h {}m since last feed", hours, minutes)
            }
        }
    }
}

/// Time elapsed since the most recent feeding. `records` must already be
/// sorted under the ordering contract, so the first entry is the most
/// recent; its absolute instant is reconstructed from `dateString` +
/// `displayTime`, never from `timestamp`.
pub fn time_since_last_feed(records: &[FeedingRecord], now: NaiveDateTime) -> TimeSinceFeed {
    let Some(last) = records.first() else {
        return TimeSinceFeed::NoRecords;
    };
    let (Some(date_string), Some(display_time)) = (&last.date_string, &last.display_time) else {
        return TimeSinceFeed::MissingFields;
    };
    let Some(instant) = parse_instant(date_string, display_time) else {
        return TimeSinceFeed::Unparsable;
    };

    let elapsed = now.signed_duration_since(instant);
    if elapsed < Duration::zero() {
        return TimeSinceFeed::InFuture;
    }
    let minutes = elapsed.num_minutes();
    TimeSinceFeed::Elapsed {
        hours: minutes / 60,
        minutes: minutes % 60,
    }
}

fn parse_instant(date_string: &str, display_time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date_string, "%Y-%m-%d").ok()?;
    let minutes = display_time_minutes(display_time)?;
    let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)?;
    Some(NaiveDateTime::new(date, time))
}

/// Per-date totals for the history view, newest date first. Only dates that
/// actually have records appear; records without a date are skipped.
pub fn daily_totals(records: &[FeedingRecord]) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        if let Some(date) = &record.date_string {
            *totals.entry(date.clone()).or_default() += record.amount;
        }
    }
    totals.into_iter().rev().collect()
}

/// One day in the trend view.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    /// Short axis label, "MM/DD".
    pub label: String,
    pub total: f64,
}

/// Fixed trailing window of [`TREND_DAYS`] days ending at `today`, oldest
/// first. Days with no records get a zero total, not an absent entry.
pub fn trailing_trend(records: &[FeedingRecord], today: NaiveDate) -> Vec<TrendPoint> {
    let totals: BTreeMap<String, f64> = daily_totals(records).into_iter().collect();

    (0..TREND_DAYS as i64)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let date_string = date.format("%Y-%m-%d").to_string();
            let total = totals.get(&date_string).copied().unwrap_or(0.0);
            TrendPoint {
                label: date.format("%m/%d").to_string(),
                date: date_string,
                total,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, date: Option<&str>, time: Option<&str>, amount: f64) -> FeedingRecord {
        FeedingRecord {
            id: id.to_string(),
            amount,
            date_string: date.map(str::to_string),
            display_time: time.map(str::to_string),
            timestamp: None,
            updated_at: None,
        }
    }

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
        )
    }

    #[test]
    fn test_day_total_and_count() {
        let records = vec![
            record("a", Some("2024-01-10"), Some("08:00"), 120.0),
            record("b", Some("2024-01-10"), Some("12:00"), 150.0),
            record("c", Some("2024-01-09"), Some("20:00"), 180.0),
            record("d", None, Some("10:00"), 90.0),
        ];
        assert_eq!(day_total(&records, "2024-01-10"), 270.0);
        assert_eq!(day_count(&records, "2024-01-10"), 2);
        assert_eq!(day_total(&records, "2024-01-08"), 0.0);
        assert_eq!(day_count(&records, "2024-01-08"), 0);
    }

    #[test]
    fn test_time_since_last_feed() {
        let records = vec![record("a", Some("2024-01-10"), Some("18:15"), 150.0)];
        let result = time_since_last_feed(&records, at("2024-01-10", "20:30"));
        assert_eq!(
            result,
            TimeSinceFeed::Elapsed {
                hours: 2,
                minutes: 15
            }
        );
        assert_eq!(result.to_string(), "2h 15m since last feed");
    }

    #[test]
    fn test_time_since_last_feed_under_an_hour() {
        let records = vec![record("a", Some("2024-01-10"), Some("20:00"), 150.0)];
        let result = time_since_last_feed(&records, at("2024-01-10", "20:30"));
        assert_eq!(
            result,
            TimeSinceFeed::Elapsed {
                hours: 0,
                minutes: 30
            }
        );
        assert_eq!(result.to_string(), "30m since last feed");
    }

    #[test]
    fn test_time_since_last_feed_fallbacks() {
        let now = at("2024-01-10", "20:30");

        assert_eq!(time_since_last_feed(&[], now), TimeSinceFeed::NoRecords);

        let missing = vec![record("a", None, Some("08:00"), 150.0)];
        assert_eq!(
            time_since_last_feed(&missing, now),
            TimeSinceFeed::MissingFields
        );

        let garbled = vec![record("a", Some("01/10/2024"), Some("08:00"), 150.0)];
        assert_eq!(
            time_since_last_feed(&garbled, now),
            TimeSinceFeed::Unparsable
        );

        // Future-dated entry yields a distinct fallback, not a negative span.
        let future = vec![record("a", Some("2024-01-11"), Some("09:00"), 150.0)];
        assert_eq!(time_since_last_feed(&future, now), TimeSinceFeed::InFuture);
    }

    #[test]
    fn test_daily_totals_newest_first() {
        let records = vec![
            record("a", Some("2024-01-09"), Some("08:00"), 100.0),
            record("b", Some("2024-01-10"), Some("08:00"), 120.0),
            record("c", Some("2024-01-09"), Some("20:00"), 80.0),
        ];
        let totals = daily_totals(&records);
        assert_eq!(
            totals,
            vec![
                ("2024-01-10".to_string(), 120.0),
                ("2024-01-09".to_string(), 180.0),
            ]
        );
    }

    #[test]
    fn test_trailing_trend_zero_fills_empty_days() {
        let records = vec![
            record("a", Some("2024-01-10"), Some("08:00"), 120.0),
            record("b", Some("2024-01-01"), Some("08:00"), 90.0),
            // Outside the 15-day window, must not appear.
            record("c", Some("2023-12-01"), Some("08:00"), 500.0),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let trend = trailing_trend(&records, today);

        assert_eq!(trend.len(), TREND_DAYS);
        assert_eq!(trend[0].date, "2023-12-27");
        assert_eq!(trend[0].total, 0.0);
        assert_eq!(trend[0].label, "12/27");
        assert_eq!(trend.last().unwrap().date, "2024-01-10");
        assert_eq!(trend.last().unwrap().total, 120.0);

        let jan_first = trend.iter().find(|p| p.date == "2024-01-01").unwrap();
        assert_eq!(jan_first.total, 90.0);

        // Every day in between is present with a zero total.
        assert!(trend.iter().all(|p| p.total >= 0.0));
    }
}
