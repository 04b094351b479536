//! Row-level access to the backing stores.
//!
//! Source systems hand the engine plain rows keyed by their own column names. The
//! adapters here only know how to fetch a table or the subset of a table whose key
//! column (trimmed) is in a batch of identifiers; projection, joins and filtering on
//! business fields belong to the normalizers.

pub mod csv_dir;
pub mod memory;
pub mod sqlite;

use serde_json::{Map, Value};

pub use csv_dir::CsvRowStore;
pub use memory::InMemoryRowStore;
pub use sqlite::SqliteRowStore;

/// One raw source row: column name to untyped value.
pub type RawRow = Map<String, Value>;

/// Upper bound on identifiers per `IN (...)` lookup.
pub const LOOKUP_BATCH: usize = 500;

/// Read access to tabular source data.
pub trait RowStore: Send + Sync {
    /// Every row of `table`, in storage order.
    fn fetch_all(&self, table: &str) -> Result<Vec<RawRow>, SourceError>;

    /// Rows of `table` whose trimmed `column` value equals one of `keys`.
    ///
    /// Keys are expected pre-trimmed. Result order follows storage order within each batch.
    fn fetch_where_in(
        &self,
        table: &str,
        column: &str,
        keys: &[String],
    ) -> Result<Vec<RawRow>, SourceError>;
}

/// Failure while reading from a source store.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("table '{table}' could not be read: {message}")]
    Query { table: String, message: String },
}

/// Trimmed textual form of a raw value, `None` for nulls and blank strings.
pub fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(text) => text.trim().to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Key lookup shared by the adapters that filter in process.
pub(crate) fn row_key(row: &RawRow, column: &str) -> Option<String> {
    row.get(column).and_then(value_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_text_trims_and_drops_blanks() {
        assert_eq!(value_text(&json!("  AB12 ")), Some("AB12".to_string()));
        assert_eq!(value_text(&json!("   ")), None);
        assert_eq!(value_text(&Value::Null), None);
        assert_eq!(value_text(&json!(1042)), Some("1042".to_string()));
    }
}
