use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Number of snapshots kept after every append.
pub const HISTORY_RETENTION: usize = 100;

/// A stored dashboard snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub change_count: i64,
    pub data: Value,
}

/// A validated snapshot awaiting insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    pub timestamp: DateTime<Utc>,
    pub change_count: i64,
    pub data: Value,
}

impl NewSnapshot {
    /// Validates an append body `{timestamp, changeCount, data}`. `data` may be any JSON
    /// value, including null, but must be present.
    pub fn from_body(body: &Value) -> Result<Self, String> {
        let object = body
            .as_object()
            .ok_or_else(|| "snapshot body must be a JSON object".to_string())?;

        let timestamp = object
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or_else(|| "timestamp is required".to_string())?;
        let timestamp = parse_timestamp(timestamp)
            .ok_or_else(|| format!("timestamp '{timestamp}' is not an ISO-8601 date-time"))?;

        let change_count = object
            .get("changeCount")
            .and_then(Value::as_i64)
            .ok_or_else(|| "changeCount must be an integer".to_string())?;

        let data = object
            .get("data")
            .cloned()
            .ok_or_else(|| "data is required".to_string())?;

        Ok(Self {
            timestamp,
            change_count,
            data,
        })
    }
}

/// Accepts RFC 3339 or a zone-less ISO date-time (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Fixed-width text form; lexical order of stored values is chronological order.
pub fn storage_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn parses_javascript_and_naive_timestamps() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 4, 15, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-04T15:30:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-04T10:30:00-05:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-04 15:30:00"), Some(expected));
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn storage_form_sorts_chronologically() {
        let early = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap();
        assert_eq!(storage_timestamp(&early), "2025-03-04T09:00:00.000Z");
        assert!(storage_timestamp(&early) < storage_timestamp(&late));
    }

    #[test]
    fn from_body_requires_every_field() {
        let snapshot = NewSnapshot::from_body(&json!({
            "timestamp": "2025-03-04T15:30:00Z",
            "changeCount": 3,
            "data": { "positions": 12 }
        }))
        .expect("valid snapshot");
        assert_eq!(snapshot.change_count, 3);
        assert_eq!(snapshot.data, json!({ "positions": 12 }));

        assert!(NewSnapshot::from_body(&json!({ "changeCount": 1, "data": {} })).is_err());
        assert!(NewSnapshot::from_body(&json!({
            "timestamp": "2025-03-04T15:30:00Z",
            "changeCount": "three",
            "data": {}
        }))
        .is_err());
        assert!(NewSnapshot::from_body(&json!({
            "timestamp": "2025-03-04T15:30:00Z",
            "changeCount": 1
        }))
        .is_err());
    }

    #[test]
    fn null_data_is_accepted() {
        let snapshot = NewSnapshot::from_body(&json!({
            "timestamp": "2025-03-04T15:30:00Z",
            "changeCount": 0,
            "data": null
        }))
        .expect("null data is still present");
        assert_eq!(snapshot.data, Value::Null);
    }
}
