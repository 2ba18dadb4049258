use crate::config::{AnkleConfig, Backend};
use crate::memory_store::MemoryStore;
use crate::record::{AnkleRecord, UserId};
use crate::remote_store::RemoteStore;
use crate::sqlite_store::SqliteStore;
use crate::AnkleError;
use chrono::NaiveDate;
use std::path::Path;

/// Per-user journal persistence, keyed by (user, date).
///
/// Every call reflects the latest persisted state. `upsert` replaces an
/// existing record for the same day without error.
pub trait RecordStore {
    fn user_exists(&self, user: &UserId) -> Result<bool, AnkleError>;

    /// Fails with `Duplicate` if the identifier is taken.
    fn create_user(&self, user: &UserId) -> Result<(), AnkleError>;

    /// Fails with `UnknownUser` if the owner is not registered.
    fn upsert(&self, user: &UserId, record: &AnkleRecord) -> Result<(), AnkleError>;

    fn get_record(&self, user: &UserId, date: NaiveDate) -> Result<Option<AnkleRecord>, AnkleError>;

    /// All records of `user`, date ascending.
    fn list_records(&self, user: &UserId) -> Result<Vec<AnkleRecord>, AnkleError>;

    /// Remove the user and every record it owns. Returns the record count removed.
    fn delete_user(&self, user: &UserId) -> Result<usize, AnkleError>;
}

/// Build the backend named in `[store] backend`.
pub fn open_store(config: &AnkleConfig, db_path: &Path) -> Result<Box<dyn RecordStore>, AnkleError> {
    match config.store.backend {
        Backend::Sqlite => {
            log::debug!("opening sqlite store at {}", db_path.display());
            Ok(Box::new(SqliteStore::open(db_path, config)?))
        }
        Backend::Memory => {
            log::debug!("using in-memory store");
            Ok(Box::new(MemoryStore::new()))
        }
        Backend::Remote => {
            let store = RemoteStore::from_config(&config.remote)?;
            log::debug!("using remote store at {}", store.endpoint());
            Ok(Box::new(store))
        }
    }
}
