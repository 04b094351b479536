use super::changes::ChangeRecord;
use super::history::{storage_timestamp, HistorySnapshot, NewSnapshot};
use super::mappings::{join_keywords, split_keywords, StoredMapping, SystemMapping};
use super::repository::{ChangeRepository, HistoryRepository, MappingRepository, RepositoryError};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct SettingsState {
    mappings: Vec<MappingRow>,
    next_mapping_id: i64,
    snapshots: Vec<SnapshotRow>,
    next_snapshot_id: i64,
    changes: Vec<ChangeRecord>,
}

/// Mirrors the stored column shapes so the keyword codec runs at the same boundary
/// as the SQLite store.
#[derive(Debug, Clone)]
struct MappingRow {
    id: i64,
    keywords: String,
    system_name: String,
    sort_order: i64,
}

#[derive(Debug, Clone)]
struct SnapshotRow {
    id: i64,
    stored_at: String,
    snapshot: HistorySnapshot,
}

/// Settings repository held in process memory. Each operation runs under a single lock,
/// so replace and append-with-eviction are atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemorySettingsStore {
    state: Arc<Mutex<SettingsState>>,
}

impl InMemorySettingsStore {
    fn lock(&self) -> Result<MutexGuard<'_, SettingsState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("settings store lock poisoned".to_string()))
    }
}

impl MappingRepository for InMemorySettingsStore {
    fn replace_all(&self, mappings: &[SystemMapping]) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let mut next_id = state.next_mapping_id;
        let rows = mappings
            .iter()
            .enumerate()
            .map(|(index, mapping)| {
                next_id += 1;
                MappingRow {
                    id: next_id,
                    keywords: join_keywords(&mapping.keywords),
                    system_name: mapping.system_name.clone(),
                    sort_order: index as i64,
                }
            })
            .collect();
        state.mappings = rows;
        state.next_mapping_id = next_id;
        Ok(())
    }

    fn list(&self) -> Result<Vec<StoredMapping>, RepositoryError> {
        let state = self.lock()?;
        let mut rows = state.mappings.clone();
        rows.sort_by_key(|row| (row.sort_order, row.id));
        Ok(rows
            .into_iter()
            .map(|row| StoredMapping {
                id: row.id,
                keywords: split_keywords(&row.keywords),
                system_name: row.system_name,
                sort_order: row.sort_order,
            })
            .collect())
    }
}

impl HistoryRepository for InMemorySettingsStore {
    fn append(&self, snapshot: &NewSnapshot, retain: usize) -> Result<i64, RepositoryError> {
        let mut state = self.lock()?;
        state.next_snapshot_id += 1;
        let id = state.next_snapshot_id;
        state.snapshots.push(SnapshotRow {
            id,
            stored_at: storage_timestamp(&snapshot.timestamp),
            snapshot: HistorySnapshot {
                id,
                timestamp: snapshot.timestamp,
                change_count: snapshot.change_count,
                data: snapshot.data.clone(),
            },
        });

        newest_first(&mut state.snapshots);
        state.snapshots.truncate(retain);
        Ok(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistorySnapshot>, RepositoryError> {
        let state = self.lock()?;
        let mut rows = state.snapshots.clone();
        newest_first(&mut rows);
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| row.snapshot)
            .collect())
    }
}

fn newest_first(rows: &mut [SnapshotRow]) {
    rows.sort_by(|a, b| b.stored_at.cmp(&a.stored_at).then(b.id.cmp(&a.id)));
}

impl ChangeRepository for InMemorySettingsStore {
    fn insert(&self, change: &ChangeRecord) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if state.changes.iter().any(|existing| existing.id == change.id) {
            return Err(RepositoryError::Conflict);
        }
        state.changes.push(change.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<ChangeRecord>, RepositoryError> {
        let state = self.lock()?;
        let mut changes = state.changes.clone();
        changes.sort_by_key(|change| change.timestamp);
        Ok(changes)
    }
}
