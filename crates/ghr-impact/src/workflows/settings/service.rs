use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::changes::ChangeRecord;
use super::history::{HistorySnapshot, NewSnapshot, HISTORY_RETENTION};
use super::mappings::{ReplaceMappingsRequest, StoredMapping};
use super::repository::{
    ChangeRepository, HistoryRepository, MappingRepository, RepositoryError,
};

/// Service fronting the writable settings store: mappings, history and the change log.
pub struct SettingsService<R> {
    repository: Arc<R>,
}

impl<R> SettingsService<R>
where
    R: MappingRepository + HistoryRepository + ChangeRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validates the whole request, then replaces every stored mapping. Returns the count written.
    pub fn replace_mappings(
        &self,
        request: ReplaceMappingsRequest,
    ) -> Result<usize, SettingsError> {
        let mappings = request
            .into_mappings()
            .map_err(|err| SettingsError::Malformed(err.to_string()))?;

        MappingRepository::replace_all(self.repository.as_ref(), &mappings).map_err(|err| {
            warn!(error = %err, "system mapping replace failed");
            SettingsError::from(err)
        })?;

        info!(count = mappings.len(), "system mappings replaced");
        Ok(mappings.len())
    }

    pub fn mappings(&self) -> Result<Vec<StoredMapping>, SettingsError> {
        Ok(MappingRepository::list(self.repository.as_ref())?)
    }

    /// Appends a snapshot and trims the log to the retention bound.
    pub fn append_snapshot(&self, body: &Value) -> Result<i64, SettingsError> {
        let snapshot = NewSnapshot::from_body(body).map_err(SettingsError::Malformed)?;
        let id = self
            .repository
            .append(&snapshot, HISTORY_RETENTION)
            .map_err(|err| {
                warn!(error = %err, "history append failed");
                SettingsError::from(err)
            })?;

        info!(id, change_count = snapshot.change_count, "history snapshot stored");
        Ok(id)
    }

    pub fn history(&self) -> Result<Vec<HistorySnapshot>, SettingsError> {
        Ok(self.repository.recent(HISTORY_RETENTION)?)
    }

    pub fn record_change(&self, body: &Value) -> Result<ChangeRecord, SettingsError> {
        let change = ChangeRecord::from_body(body).map_err(SettingsError::Malformed)?;
        ChangeRepository::insert(self.repository.as_ref(), &change)?;
        info!(id = %change.id, job_id = %change.job_id, kind = %change.kind, "change recorded");
        Ok(change)
    }

    pub fn changes(&self) -> Result<Vec<ChangeRecord>, SettingsError> {
        Ok(ChangeRepository::list(self.repository.as_ref())?)
    }
}

/// Error raised by the settings service.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid request: {0}")]
    Malformed(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
