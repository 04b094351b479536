//! Lenient column decoders for raw source rows.
//!
//! The same table may arrive typed (SQLite) or as text (CSV), so every decoder accepts
//! both shapes. Blank text is treated as absent; text that is present but cannot be read
//! as the expected type is an error, which fails the row.

use crate::store::value_text;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn raw<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer)
}

pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(raw(deserializer)?.as_ref().and_then(value_text))
}

/// Status columns compared verbatim: the string is kept untrimmed, only blank cells drop.
pub(crate) fn exact_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match raw(deserializer)? {
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => value_text(&other),
        None => None,
    })
}

/// Identifier columns: present and non-blank, trimmed.
pub(crate) fn required_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    text(deserializer)?.ok_or_else(|| D::Error::custom("identifier is blank"))
}

pub(crate) fn decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match raw(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64()),
        Some(other) => match value_text(&other) {
            None => Ok(None),
            Some(text) => text
                .trim_start_matches('$')
                .replace(',', "")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("'{text}' is not a number"))),
        },
    }
}

pub(crate) fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match raw(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(value) => Ok(Some(value)),
            None => whole(number.as_f64(), &number.to_string()).map_err(D::Error::custom),
        },
        Some(other) => match value_text(&other) {
            None => Ok(None),
            Some(text) => match text.parse::<i64>() {
                Ok(value) => Ok(Some(value)),
                Err(_) => whole(text.parse::<f64>().ok(), &text).map_err(D::Error::custom),
            },
        },
    }
}

fn whole(value: Option<f64>, original: &str) -> Result<Option<i64>, String> {
    match value {
        Some(number) if number.fract() == 0.0 && number.is_finite() => Ok(Some(number as i64)),
        _ => Err(format!("'{original}' is not a whole number")),
    }
}

pub(crate) fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match raw(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(value)),
        Some(Value::Number(number)) => Ok(Some(number.as_f64().unwrap_or(0.0) != 0.0)),
        Some(other) => match value_text(&other) {
            None => Ok(None),
            Some(text) => match text.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "y" => Ok(Some(true)),
                "0" | "false" | "no" | "n" => Ok(Some(false)),
                _ => Err(D::Error::custom(format!("'{text}' is not a yes/no flag"))),
            },
        },
    }
}

pub(crate) fn datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match raw(deserializer)?.as_ref().and_then(value_text) {
        None => Ok(None),
        Some(text) => parse_datetime(&text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("'{text}' is not a date"))),
    }
}

/// Reads the date shapes the source exports use. Zoned values are converted to UTC.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %I:%M %p",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}
