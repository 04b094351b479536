use super::{row_key, RawRow, RowStore, SourceError};
use serde_json::Value;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Reads each table from `<dir>/<table>.csv`.
///
/// Exports from both staffing systems arrive as CSV drops; every cell is kept as text
/// and blank cells become nulls.
#[derive(Debug, Clone)]
pub struct CsvRowStore {
    dir: PathBuf,
}

impl CsvRowStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }

    fn load(&self, table: &str) -> Result<Vec<RawRow>, SourceError> {
        let path = self.table_path(table);
        let file = std::fs::File::open(&path).map_err(|err| SourceError::Query {
            table: table.to_string(),
            message: format!("{}: {err}", path.display()),
        })?;
        read_rows(file).map_err(|err| SourceError::Query {
            table: table.to_string(),
            message: err.to_string(),
        })
    }
}

/// Parses CSV with a header row into raw rows.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut row = RawRow::new();
        for (index, header) in headers.iter().enumerate() {
            let value = match record.get(index) {
                Some(cell) if !cell.is_empty() => Value::String(cell.to_string()),
                _ => Value::Null,
            };
            row.insert(header.clone(), value);
        }
        rows.push(row);
    }

    Ok(rows)
}

impl RowStore for CsvRowStore {
    fn fetch_all(&self, table: &str) -> Result<Vec<RawRow>, SourceError> {
        self.load(table)
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
        let wanted: HashSet<&str> = keys.iter().map(String::as_str).collect();
        Ok(self
            .load(table)?
            .into_iter()
            .filter(|row| {
                row_key(row, column)
                    .map(|key| wanted.contains(key.as_str()))
                    .unwrap_or(false)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_rows_maps_blank_cells_to_null() {
        let rows = read_rows("\u{feff}Job Id,Status\n V-1 ,Active\nV-2,\n".as_bytes())
            .expect("csv parses");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Job Id"], Value::String("V-1".to_string()));
        assert_eq!(rows[1]["Status"], Value::Null);
    }

    #[test]
    fn fetch_where_in_matches_trimmed_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut file =
            std::fs::File::create(dir.path().join("subs.csv")).expect("create csv");
        writeln!(file, "Job Id,Full Name").expect("write");
        writeln!(file, "\"V-1 \",Ana").expect("write");
        writeln!(file, "V-9,Ben").expect("write");
        drop(file);

        let store = CsvRowStore::new(dir.path());
        let rows = store
            .fetch_where_in("subs", "Job Id", &["V-1".to_string()])
            .expect("lookup succeeds");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Full Name"], Value::String("Ana".to_string()));
    }

    #[test]
    fn missing_table_is_a_query_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CsvRowStore::new(dir.path());
        match store.fetch_all("STAGING_VNDLY_JOBS") {
            Err(SourceError::Query { table, .. }) => assert_eq!(table, "STAGING_VNDLY_JOBS"),
            other => panic!("expected query error, got {other:?}"),
        }
    }
}
