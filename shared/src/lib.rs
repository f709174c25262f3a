use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Key prefix for confirmed feeding records: "record_<epoch_millis>_<random>"
pub const RECORD_KEY_PREFIX: &str = "record_";

/// Key prefix for client-local records that have not been confirmed by the
/// server yet. These never appear in the store; the server assigns (or keeps)
/// a `record_*` id on create.
pub const LOCAL_KEY_PREFIX: &str = "temp_";

/// Key prefix for daily vitamin-D3 checklist entries: "d3_<YYYY-MM-DD>"
pub const D3_KEY_PREFIX: &str = "d3_";

/// Marker carried in a POST body that identifies a D3 checklist update
/// rather than a feeding record.
pub const D3_UPDATE_KIND: &str = "d3";

/// One logged feeding event.
///
/// Everything except `amount` is optional on deserialisation: stored values
/// can be malformed or partially filled, and the ordering contract has to
/// cope with that instead of failing the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedingRecord {
    /// Store key, attached on read. Empty only for bodies that have not been
    /// assigned an id yet.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Volume in milliliters.
    #[serde(default)]
    pub amount: f64,
    /// Calendar date the feeding is attributed to (local "YYYY-MM-DD").
    /// Independently authoritative; not derived from `timestamp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_string: Option<String>,
    /// Wall-clock time of day ("HH:MM", 24-hour).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_time: Option<String>,
    /// Creation instant in epoch milliseconds, final sort tie-break only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Instant of the last local mutation, used by merge-by-recency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl FeedingRecord {
    /// Whether this record still carries a client-local id, i.e. it has been
    /// created optimistically and not yet confirmed by the server.
    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_KEY_PREFIX)
    }
}

/// Generate a server-side record id: "record_<epoch_millis>_<random>".
pub fn generate_record_id(epoch_millis: i64) -> String {
    format!("{}{}_{}", RECORD_KEY_PREFIX, epoch_millis, random_suffix())
}

/// Generate a client-local id for an optimistic record: "temp_<millis>_<random>".
pub fn generate_local_id(epoch_millis: i64) -> String {
    format!("{}{}_{}", LOCAL_KEY_PREFIX, epoch_millis, random_suffix())
}

fn random_suffix() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    hex[..9].to_string()
}

/// Store key for a date's D3 checklist entry.
pub fn d3_key(date_string: &str) -> String {
    format!("{}{}", D3_KEY_PREFIX, date_string)
}

/// Whether a store key belongs to the D3 checklist family. List enumeration
/// filters these out of the feeding record results.
pub fn is_d3_key(key: &str) -> bool {
    key.starts_with(D3_KEY_PREFIX)
}

/// Parse "HH:MM" into minutes since midnight.
pub fn display_time_minutes(display_time: &str) -> Option<u32> {
    let (h, m) = display_time.split_once(':')?;
    let hours: u32 = h.trim().parse().ok()?;
    let minutes: u32 = m.trim().parse().ok()?;
    Some(hours * 60 + minutes)
}

/// The composite sort key shared by the gateway and the client.
///
/// Ordering contract (newest first):
/// 1. `dateString` descending, lexicographic (the format is zero-padded, so
///    this matches chronological order); records with no date sort last;
/// 2. `displayTime` as minutes-since-midnight descending, missing or
///    unparsable treated as "00:00";
/// 3. `timestamp` descending when both sides have one, otherwise equal.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSortKey {
    pub date_string: Option<String>,
    pub minutes: u32,
    pub timestamp: Option<i64>,
}

impl RecordSortKey {
    pub fn of_record(record: &FeedingRecord) -> Self {
        Self {
            date_string: record.date_string.clone(),
            minutes: record
                .display_time
                .as_deref()
                .and_then(display_time_minutes)
                .unwrap_or(0),
            timestamp: record.timestamp,
        }
    }

    /// Extract the sort key from a raw JSON record, tolerating missing or
    /// mistyped fields. Used by the gateway, which stores bodies verbatim.
    pub fn of_value(value: &Value) -> Self {
        Self {
            date_string: value
                .get("dateString")
                .and_then(Value::as_str)
                .map(str::to_string),
            minutes: value
                .get("displayTime")
                .and_then(Value::as_str)
                .and_then(display_time_minutes)
                .unwrap_or(0),
            timestamp: value.get("timestamp").and_then(Value::as_i64),
        }
    }

    /// Compare two keys under the ordering contract (newest first).
    pub fn compare(&self, other: &Self) -> Ordering {
        match (&self.date_string, &other.date_string) {
            (Some(a), Some(b)) if a != b => return b.cmp(a),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            _ => {}
        }
        match other.minutes.cmp(&self.minutes) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        match (self.timestamp, other.timestamp) {
            (Some(a), Some(b)) => b.cmp(&a),
            _ => Ordering::Equal,
        }
    }
}

/// Sort feeding records newest-first per the ordering contract. The sort is
/// stable, so records the contract treats as equal keep their relative order.
pub fn sort_records(records: &mut [FeedingRecord]) {
    records.sort_by(|a, b| RecordSortKey::of_record(a).compare(&RecordSortKey::of_record(b)));
}

/// Sort raw JSON records newest-first per the ordering contract.
pub fn sort_record_values(values: &mut [Value]) {
    values.sort_by(|a, b| RecordSortKey::of_value(a).compare(&RecordSortKey::of_value(b)));
}

/// Response body for `GET /api/records?type=d3&date=...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct D3StatusResponse {
    /// Completion flags for the two daily doses.
    pub status: [bool; 2],
}

/// POST body for a D3 checklist update, distinguished from a feeding record
/// by its `"type": "d3"` marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct D3Update {
    #[serde(rename = "type")]
    pub kind: String,
    pub date_string: String,
    pub status: [bool; 2],
}

impl D3Update {
    pub fn new(date_string: impl Into<String>, status: [bool; 2]) -> Self {
        Self {
            kind: D3_UPDATE_KIND.to_string(),
            date_string: date_string.into(),
            status,
        }
    }
}

/// Response body for a successful record create, echoing the key the record
/// was stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecordResponse {
    pub success: bool,
    pub id: String,
}

/// Response body for mutations that only report success (D3 writes, deletes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error body returned by the gateway for 400/500 responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(
        id: &str,
        date: Option<&str>,
        time: Option<&str>,
        timestamp: Option<i64>,
    ) -> FeedingRecord {
        FeedingRecord {
            id: id.to_string(),
            amount: 150.0,
            date_string: date.map(str::to_string),
            display_time: time.map(str::to_string),
            timestamp,
            updated_at: timestamp,
        }
    }

    #[test]
    fn test_generated_record_id_shape() {
        let id = generate_record_id(1704880800000);
        assert!(id.starts_with("record_1704880800000_"));
        // prefix + millis + underscore + 9 random chars
        assert_eq!(id.len(), "record_1704880800000_".len() + 9);
    }

    #[test]
    fn test_local_id_is_distinguishable() {
        let id = generate_local_id(1704880800000);
        assert!(id.starts_with("temp_"));
        let rec = record(&id, Some("2024-01-10"), Some("08:00"), Some(1));
        assert!(rec.is_local());
        let confirmed = record("record_1_abc", Some("2024-01-10"), Some("08:00"), Some(1));
        assert!(!confirmed.is_local());
    }

    #[test]
    fn test_key_families_do_not_collide() {
        assert!(is_d3_key(&d3_key("2024-01-10")));
        assert!(!is_d3_key(&generate_record_id(1000)));
        assert!(!is_d3_key(&generate_local_id(1000)));
        assert_eq!(d3_key("2024-01-10"), "d3_2024-01-10");
    }

    #[test]
    fn test_display_time_minutes() {
        assert_eq!(display_time_minutes("00:00"), Some(0));
        assert_eq!(display_time_minutes("08:30"), Some(510));
        assert_eq!(display_time_minutes("23:59"), Some(1439));
        assert_eq!(display_time_minutes("20"), None);
        assert_eq!(display_time_minutes("aa:bb"), None);
        assert_eq!(display_time_minutes(""), None);
    }

    #[test]
    fn test_sort_by_date_descending_regardless_of_time() {
        let mut records = vec![
            record("a", Some("2024-01-09"), Some("23:59"), Some(9)),
            record("b", Some("2024-01-10"), Some("00:01"), Some(1)),
        ];
        sort_records(&mut records);
        assert_eq!(records[0].id, "b");
        assert_eq!(records[1].id, "a");
    }

    #[test]
    fn test_sort_same_date_by_display_time_descending() {
        let mut records = vec![
            record("early", Some("2024-01-10"), Some("08:00"), Some(5)),
            record("late", Some("2024-01-10"), Some("20:30"), Some(1)),
        ];
        sort_records(&mut records);
        assert_eq!(records[0].id, "late");
    }

    #[test]
    fn test_sort_same_minute_by_timestamp_descending() {
        let mut records = vec![
            record("old", Some("2024-01-10"), Some("08:00"), Some(1000)),
            record("new", Some("2024-01-10"), Some("08:00"), Some(2000)),
        ];
        sort_records(&mut records);
        assert_eq!(records[0].id, "new");
        assert_eq!(records[1].id, "old");
    }

    #[test]
    fn test_sort_missing_timestamp_is_not_an_error() {
        let mut records = vec![
            record("no_ts", Some("2024-01-10"), Some("08:00"), None),
            record("ts", Some("2024-01-10"), Some("08:00"), Some(2000)),
        ];
        // Relative order of the pair is unspecified; sorting just must not
        // panic and must keep both records.
        sort_records(&mut records);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_sort_malformed_records() {
        let mut records = vec![
            record("dateless", None, Some("10:00"), Some(3000)),
            record("timeless", Some("2024-01-08"), None, Some(2000)),
            record("full", Some("2024-01-09"), Some("07:15"), Some(1000)),
        ];
        sort_records(&mut records);
        // Dated records first (date descending), the date-less record last.
        assert_eq!(records[0].id, "full");
        assert_eq!(records[1].id, "timeless");
        assert_eq!(records[2].id, "dateless");
    }

    #[test]
    fn test_missing_display_time_sorts_as_midnight() {
        let mut records = vec![
            record("timeless", Some("2024-01-10"), None, Some(9000)),
            record("early", Some("2024-01-10"), Some("00:30"), Some(1)),
        ];
        sort_records(&mut records);
        assert_eq!(records[0].id, "early");
        assert_eq!(records[1].id, "timeless");
    }

    #[test]
    fn test_sort_raw_values_matches_record_sort() {
        let mut values = vec![
            json!({"id": "a", "dateString": "2024-01-09", "displayTime": "23:00"}),
            json!({"id": "b", "displayTime": "12:00"}),
            json!({"id": "c", "dateString": "2024-01-10", "displayTime": "06:00"}),
        ];
        sort_record_values(&mut values);
        let ids: Vec<&str> = values.iter().map(|v| v["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_record_wire_format_is_camel_case() {
        let rec = record("record_1_abc", Some("2024-01-10"), Some("20:30"), Some(1000));
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["dateString"], "2024-01-10");
        assert_eq!(value["displayTime"], "20:30");
        assert_eq!(value["timestamp"], 1000);
        assert_eq!(value["updatedAt"], 1000);
    }

    #[test]
    fn test_record_parses_with_missing_fields() {
        let rec: FeedingRecord = serde_json::from_value(json!({"amount": 90})).unwrap();
        assert_eq!(rec.amount, 90.0);
        assert!(rec.date_string.is_none());
        assert!(rec.display_time.is_none());
        assert!(rec.timestamp.is_none());
    }

    #[test]
    fn test_d3_update_wire_format() {
        let update = D3Update::new("2024-01-10", [true, false]);
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["type"], "d3");
        assert_eq!(value["dateString"], "2024-01-10");
        assert_eq!(value["status"], json!([true, false]));
    }
}
