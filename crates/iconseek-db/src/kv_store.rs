use std::sync::Arc;

use redb::Database;

use iconseek_core::{KeyValueStore, StorageError};

use crate::tables::STORAGE_TABLE;

/// redb implementation of KeyValueStore.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Initialize the database tables.
    pub fn init_tables(db: &Database) -> Result<(), StorageError> {
        let write_txn = db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let _ = write_txn
                .open_table(STORAGE_TABLE)
                .map_err(|e| StorageError::Database(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let table = read_txn
            .open_table(STORAGE_TABLE)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let value = table
            .get(key)
            .map_err(|e| StorageError::Database(e.to_string()))?
            .map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let existed = {
            let mut table = write_txn
                .open_table(STORAGE_TABLE)
                .map_err(|e| StorageError::Database(e.to_string()))?;

            let removed = table
                .remove(key)
                .map_err(|e| StorageError::Database(e.to_string()))?;
            removed.is_some()
        };

        write_txn
            .commit()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(existed)
    }

    /// All entries are committed in one write transaction.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        {
            let mut table = write_txn
                .open_table(STORAGE_TABLE)
                .map_err(|e| StorageError::Database(e.to_string()))?;

            for (key, value) in entries {
                table
                    .insert(*key, *value)
                    .map_err(|e| StorageError::Database(e.to_string()))?;
            }
        }

        write_txn
            .commit()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }
}
