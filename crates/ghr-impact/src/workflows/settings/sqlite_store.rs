use super::changes::ChangeRecord;
use super::history::{storage_timestamp, HistorySnapshot, NewSnapshot};
use super::mappings::{join_keywords, split_keywords, StoredMapping, SystemMapping};
use super::repository::{ChangeRepository, HistoryRepository, MappingRepository, RepositoryError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode};
use serde_json::Value;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS system_mappings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    keywords TEXT NOT NULL,
    system_name TEXT NOT NULL,
    sort_order INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS ghr_history_snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    snapshot_timestamp TEXT NOT NULL,   -- RFC 3339, millisecond precision, UTC
    change_count INTEGER NOT NULL,
    snapshot_data TEXT NOT NULL         -- JSON document
);

CREATE INDEX IF NOT EXISTS idx_history_timestamp
    ON ghr_history_snapshots (snapshot_timestamp DESC);

CREATE TABLE IF NOT EXISTS ghr_changes (
    id TEXT PRIMARY KEY,
    timestamp TEXT NOT NULL,
    job_id TEXT NOT NULL,
    type TEXT NOT NULL,
    data TEXT NOT NULL,
    user_name TEXT NOT NULL
);
"#;

/// Settings repository over a SQLite database file. Every operation acquires its own
/// connection; writes run inside a transaction that rolls back unless committed.
#[derive(Debug, Clone)]
pub struct SqliteSettingsStore {
    path: PathBuf,
}

impl SqliteSettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, RepositoryError> {
        let conn = Connection::open(&self.path).map_err(|err| {
            RepositoryError::Unavailable(format!("{}: {err}", self.path.display()))
        })?;
        conn.execute_batch(SETTINGS_SCHEMA)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
        Ok(conn)
    }
}

fn transaction_error(err: rusqlite::Error) -> RepositoryError {
    RepositoryError::Transaction(err.to_string())
}

fn read_error(err: rusqlite::Error) -> RepositoryError {
    RepositoryError::Unavailable(err.to_string())
}

impl MappingRepository for SqliteSettingsStore {
    fn replace_all(&self, mappings: &[SystemMapping]) -> Result<(), RepositoryError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().map_err(transaction_error)?;
        tx.execute("DELETE FROM system_mappings", [])
            .map_err(transaction_error)?;
        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO system_mappings (keywords, system_name, sort_order) VALUES (?1, ?2, ?3)",
                )
                .map_err(transaction_error)?;
            for (index, mapping) in mappings.iter().enumerate() {
                insert
                    .execute(params![
                        join_keywords(&mapping.keywords),
                        mapping.system_name,
                        index as i64
                    ])
                    .map_err(transaction_error)?;
            }
        }
        tx.commit().map_err(transaction_error)
    }

    fn list(&self) -> Result<Vec<StoredMapping>, RepositoryError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, keywords, system_name, sort_order FROM system_mappings ORDER BY sort_order, id",
            )
            .map_err(read_error)?;
        let rows = stmt
            .query_map([], |row| {
                let keywords: String = row.get(1)?;
                Ok(StoredMapping {
                    id: row.get(0)?,
                    keywords: split_keywords(&keywords),
                    system_name: row.get(2)?,
                    sort_order: row.get(3)?,
                })
            })
            .map_err(read_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(read_error)
    }
}

impl HistoryRepository for SqliteSettingsStore {
    fn append(&self, snapshot: &NewSnapshot, retain: usize) -> Result<i64, RepositoryError> {
        let data = serde_json::to_string(&snapshot.data)
            .map_err(|err| RepositoryError::Transaction(err.to_string()))?;

        let mut conn = self.connect()?;
        let tx = conn.transaction().map_err(transaction_error)?;
        tx.execute(
            "INSERT INTO ghr_history_snapshots (snapshot_timestamp, change_count, snapshot_data) VALUES (?1, ?2, ?3)",
            params![storage_timestamp(&snapshot.timestamp), snapshot.change_count, data],
        )
        .map_err(transaction_error)?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "DELETE FROM ghr_history_snapshots WHERE id NOT IN (
                SELECT id FROM ghr_history_snapshots
                ORDER BY snapshot_timestamp DESC, id DESC
                LIMIT ?1
            )",
            params![retain as i64],
        )
        .map_err(transaction_error)?;
        tx.commit().map_err(transaction_error)?;
        Ok(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistorySnapshot>, RepositoryError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, snapshot_timestamp, change_count, snapshot_data
                 FROM ghr_history_snapshots
                 ORDER BY snapshot_timestamp DESC, id DESC
                 LIMIT ?1",
            )
            .map_err(read_error)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .map_err(read_error)?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (id, timestamp, change_count, data) = row.map_err(read_error)?;
            snapshots.push(HistorySnapshot {
                id,
                timestamp: stored_timestamp(&timestamp)?,
                change_count,
                data: stored_json(data.as_deref())?,
            });
        }
        Ok(snapshots)
    }
}

impl ChangeRepository for SqliteSettingsStore {
    fn insert(&self, change: &ChangeRecord) -> Result<(), RepositoryError> {
        let data = serde_json::to_string(&change.data)
            .map_err(|err| RepositoryError::Transaction(err.to_string()))?;
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO ghr_changes (id, timestamp, job_id, type, data, user_name) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                change.id,
                storage_timestamp(&change.timestamp),
                change.job_id,
                change.kind,
                data,
                change.user
            ],
        )
        .map_err(|err| match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => RepositoryError::Conflict,
            _ => transaction_error(err),
        })?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<ChangeRecord>, RepositoryError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, job_id, type, data, user_name FROM ghr_changes ORDER BY timestamp ASC, rowid ASC",
            )
            .map_err(read_error)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map_err(read_error)?;

        let mut changes = Vec::new();
        for row in rows {
            let (id, timestamp, job_id, kind, data, user) = row.map_err(read_error)?;
            changes.push(ChangeRecord {
                id,
                timestamp: stored_timestamp(&timestamp)?,
                job_id,
                kind,
                data: stored_json(data.as_deref())?,
                user,
            });
        }
        Ok(changes)
    }
}

fn stored_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| RepositoryError::Corrupt(format!("timestamp '{raw}': {err}")))
}

fn stored_json(raw: Option<&str>) -> Result<Value, RepositoryError> {
    match raw {
        Some(text) if !text.trim().is_empty() => serde_json::from_str(text)
            .map_err(|err| RepositoryError::Corrupt(format!("snapshot data: {err}"))),
        _ => Ok(Value::Object(Default::default())),
    }
}
