//! Iconseek DB - redb implementation of the key-value medium.

pub mod kv_store;
pub mod tables;

pub use kv_store::RedbStore;

use std::path::Path;
use std::sync::Arc;

use redb::Database;

use iconseek_core::StorageError;

/// Open (or create) a database with all required tables.
pub fn init_database(path: impl AsRef<Path>) -> Result<Arc<Database>, StorageError> {
    let db = Database::create(path).map_err(|e| StorageError::Database(e.to_string()))?;

    RedbStore::init_tables(&db)?;

    Ok(Arc::new(db))
}
