//! Embedded redb backend.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use super::{KeyValueStore, StorageError};

/// Single table mirroring browser local storage.
///
/// Key: storage key (e.g. "promoOrderV1")
/// Value: JSON document as string
pub const TABLE_STORAGE: TableDefinition<&str, &str> = TableDefinition::new("storage_v1");

#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Creates or opens the database file and makes sure the table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self::init(path.as_ref())?)
    }

    fn init(path: &Path) -> Result<Self, redb::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(redb::Error::Io)?;
        }
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(TABLE_STORAGE)?;
        }
        write_txn.commit()?;
        tracing::debug!(path = %path.display(), "opened storefront database");
        Ok(Self { db: Arc::new(db) })
    }

    fn read(&self, key: &str) -> Result<Option<String>, redb::Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_STORAGE)?;
        let value = table.get(key)?.map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn write(&self, key: &str, value: Option<&str>) -> Result<(), redb::Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_STORAGE)?;
            match value {
                Some(value) => { table.insert(key, value)?; }
                None => { table.remove(key)?; }
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> { Ok(self.read(key)?) }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> { Ok(self.write(key, Some(value))?) }
    fn remove(&self, key: &str) -> Result<(), StorageError> { Ok(self.write(key, None)?) }
}
