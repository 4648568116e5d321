//! Iconseek Core - Icon records, favorite identifiers, and the favorites store.
//!
//! This crate has no dependencies on other Iconseek crates and performs no
//! I/O beyond the [`KeyValueStore`] it is handed.

pub mod error;
pub mod favorites;
pub mod icon;
pub mod identifier;
pub mod storage;

// Re-exports for convenience
pub use error::StorageError;
pub use favorites::{Change, FavoritesStore};
pub use icon::{IconFormat, IconRecord, NativeId, RasterSize};
pub use identifier::{
    current_epoch_ms, native_id, synthesize, Clock, Disambiguator, FavoriteId, IdResolver,
};
pub use storage::{
    KeyValueStore, MemoryStore, NotifyingStore, StorageChange, FAVORITE_IDS_KEY,
    FAVORITE_RECORDS_KEY,
};
