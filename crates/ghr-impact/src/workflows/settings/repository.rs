use super::changes::ChangeRecord;
use super::history::{HistorySnapshot, NewSnapshot};
use super::mappings::{StoredMapping, SystemMapping};

/// Persistence for the ordered keyword→system list.
pub trait MappingRepository: Send + Sync {
    /// Deletes every stored mapping and inserts `mappings` with `sort_order` = index,
    /// as one transaction.
    fn replace_all(&self, mappings: &[SystemMapping]) -> Result<(), RepositoryError>;
    /// All mappings ordered by `sort_order`, then `id`.
    fn list(&self) -> Result<Vec<StoredMapping>, RepositoryError>;
}

/// Persistence for dashboard snapshots.
pub trait HistoryRepository: Send + Sync {
    /// Inserts `snapshot`, then deletes all but the `retain` most recent, as one transaction.
    fn append(&self, snapshot: &NewSnapshot, retain: usize) -> Result<i64, RepositoryError>;
    /// Up to `limit` snapshots, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<HistorySnapshot>, RepositoryError>;
}

/// Persistence for the change log.
pub trait ChangeRepository: Send + Sync {
    fn insert(&self, change: &ChangeRecord) -> Result<(), RepositoryError>;
    /// Every change, oldest first.
    fn list(&self) -> Result<Vec<ChangeRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("transaction rolled back: {0}")]
    Transaction(String),
    #[error("stored record is unreadable: {0}")]
    Corrupt(String),
}
