use super::{row_key, RawRow, RowStore, SourceError};
use std::collections::{HashMap, HashSet};

/// Row store backed by in-process tables; tables can be marked unavailable to
/// simulate a source outage.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRowStore {
    tables: HashMap<String, Vec<RawRow>>,
    unavailable: HashSet<String>,
}

impl InMemoryRowStore {
    pub fn with_table(mut self, table: &str, rows: Vec<RawRow>) -> Self {
        self.tables.insert(table.to_string(), rows);
        self
    }

    pub fn with_unavailable(mut self, table: &str) -> Self {
        self.unavailable.insert(table.to_string());
        self
    }

    fn table(&self, table: &str) -> Result<&[RawRow], SourceError> {
        if self.unavailable.contains(table) {
            return Err(SourceError::Unavailable(format!("{table} is offline")));
        }
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| SourceError::Query {
                table: table.to_string(),
                message: "no such table".to_string(),
            })
    }
}

impl RowStore for InMemoryRowStore {
    fn fetch_all(&self, table: &str) -> Result<Vec<RawRow>, SourceError> {
        Ok(self.table(table)?.to_vec())
    }

    fn fetch_where_in(
        &self,
        table: &str,
        column: &str,
        keys: &[String],
    ) -> Result<Vec<RawRow>, SourceError> {
        let rows = self.table(table)?;
        let wanted: HashSet<&str> = keys.iter().map(String::as_str).collect();
        Ok(rows
            .iter()
            .filter(|row| {
                row_key(row, column)
                    .map(|key| wanted.contains(key.as_str()))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}
