use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::history::parse_timestamp;

/// A user edit recorded against a position on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub job_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
    pub user: String,
}

impl ChangeRecord {
    /// Validates `{id, timestamp, jobId, type, data, user?}`; `user` defaults to "Unknown".
    pub fn from_body(body: &Value) -> Result<Self, String> {
        let object = body
            .as_object()
            .ok_or_else(|| "change body must be a JSON object".to_string())?;

        let id = scalar_text(object.get("id")).ok_or_else(|| "id is required".to_string())?;
        let raw_timestamp = object
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or_else(|| "timestamp is required".to_string())?;
        let timestamp = parse_timestamp(raw_timestamp)
            .ok_or_else(|| format!("timestamp '{raw_timestamp}' is not an ISO-8601 date-time"))?;
        let job_id =
            scalar_text(object.get("jobId")).ok_or_else(|| "jobId is required".to_string())?;
        let kind = scalar_text(object.get("type")).ok_or_else(|| "type is required".to_string())?;
        let data = object
            .get("data")
            .cloned()
            .ok_or_else(|| "data is required".to_string())?;
        let user = scalar_text(object.get("user")).unwrap_or_else(|| "Unknown".to_string());

        Ok(Self {
            id,
            timestamp,
            job_id,
            kind,
            data,
            user,
        })
    }
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.trim().to_string()).filter(|text| !text.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_ids_are_kept_as_text_and_user_defaults() {
        let change = ChangeRecord::from_body(&json!({
            "id": 1733412000123_i64,
            "timestamp": "2025-12-05T15:20:00Z",
            "jobId": " 48213 ",
            "type": "margin",
            "data": { "from": 25, "to": 30 }
        }))
        .expect("valid change");

        assert_eq!(change.id, "1733412000123");
        assert_eq!(change.job_id, "48213");
        assert_eq!(change.user, "Unknown");

        let wire = serde_json::to_value(&change).expect("serializes");
        assert_eq!(wire["type"], "margin");
        assert_eq!(wire["jobId"], "48213");
    }

    #[test]
    fn missing_job_id_is_rejected() {
        let error = ChangeRecord::from_body(&json!({
            "id": "c-1",
            "timestamp": "2025-12-05T15:20:00Z",
            "type": "note",
            "data": {}
        }))
        .expect_err("jobId missing");
        assert!(error.contains("jobId"));
    }
}
