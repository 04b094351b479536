//! Writable dashboard settings: the ordered keyword→system mapping list, the bounded
//! snapshot history and the change log.

pub mod changes;
pub mod history;
pub mod mappings;
pub mod memory_store;
pub mod repository;
pub mod router;
pub mod service;
pub mod sqlite_store;

#[cfg(test)]
mod tests;

pub use changes::ChangeRecord;
pub use history::{HistorySnapshot, NewSnapshot, HISTORY_RETENTION};
pub use mappings::{
    join_keywords, split_keywords, InvalidMapping, ReplaceMappingsRequest, StoredMapping,
    SystemMapping,
};
pub use memory_store::InMemorySettingsStore;
pub use repository::{ChangeRepository, HistoryRepository, MappingRepository, RepositoryError};
pub use router::settings_router;
pub use service::{SettingsError, SettingsService};
pub use sqlite_store::SqliteSettingsStore;
