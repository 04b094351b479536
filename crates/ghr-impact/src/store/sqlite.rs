use super::{RawRow, RowStore, SourceError, LOOKUP_BATCH};
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags, Params, Statement};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Read-only row store over a SQLite database. A connection is opened per call and
/// released when the call returns.
#[derive(Debug, Clone)]
pub struct SqliteRowStore {
    path: PathBuf,
}

impl SqliteRowStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, SourceError> {
        Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|err| SourceError::Unavailable(format!("{}: {err}", self.path.display())))
    }
}

impl RowStore for SqliteRowStore {
    fn fetch_all(&self, table: &str) -> Result<Vec<RawRow>, SourceError> {
        let conn = self.connect()?;
        let sql = format!("SELECT * FROM {}", quote_identifier(table));
        let mut stmt = conn.prepare(&sql).map_err(|err| query_error(table, err))?;
        collect_rows(&mut stmt, []).map_err(|err| query_error(table, err))
    }

    fn fetch_where_in(
        &self,
        table: &str,
        column: &str,
        keys: &[String],
    ) -> Result<Vec<RawRow>, SourceError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.connect()?;
        let mut rows = Vec::new();
        for batch in keys.chunks(LOOKUP_BATCH) {
            let placeholders = vec!["?"; batch.len()].join(", ");
            let sql = format!(
                "SELECT * FROM {} WHERE TRIM({}) IN ({placeholders})",
                quote_identifier(table),
                quote_identifier(column),
            );
            let mut stmt = conn.prepare(&sql).map_err(|err| query_error(table, err))?;
            rows.extend(
                collect_rows(&mut stmt, params_from_iter(batch.iter()))
                    .map_err(|err| query_error(table, err))?,
            );
        }
        Ok(rows)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn query_error(table: &str, err: rusqlite::Error) -> SourceError {
    SourceError::Query {
        table: table.to_string(),
        message: err.to_string(),
    }
}

fn collect_rows<P: Params>(stmt: &mut Statement<'_>, params: P) -> rusqlite::Result<Vec<RawRow>> {
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut rows = stmt.query(params)?;
    let mut collected = Vec::new();
    while let Some(row) = rows.next()? {
        let mut raw = RawRow::new();
        for (index, column) in columns.iter().enumerate() {
            raw.insert(column.clone(), json_value(row.get_ref(index)?));
        }
        collected.push(raw);
    }
    Ok(collected)
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(number) => Value::from(number),
        ValueRef::Real(number) => serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}
