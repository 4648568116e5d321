//! The favorites store.
//!
//! A set of favorite identifiers and the list of favorite records are held
//! side by side and mirrored to a [`KeyValueStore`] under two keys. Every
//! mutation goes through this type, which keeps the two in lockstep: each
//! identifier in the set belongs to exactly one record in the list.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::StorageError;
use crate::icon::{IconRecord, NativeId};
use crate::identifier::{native_id, FavoriteId, IdResolver};
use crate::storage::{KeyValueStore, StorageChange, FAVORITE_IDS_KEY, FAVORITE_RECORDS_KEY};

/// Outcome of a mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added(FavoriteId),
    Removed(FavoriteId),
    Unchanged(FavoriteId),
}

impl Change {
    pub fn id(&self) -> &FavoriteId {
        match self {
            Change::Added(id) | Change::Removed(id) | Change::Unchanged(id) => id,
        }
    }

    pub fn is_changed(&self) -> bool {
        !matches!(self, Change::Unchanged(_))
    }
}

pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    resolver: IdResolver,
    ids: HashSet<FavoriteId>,
    records: Vec<IconRecord>,
    dirty: bool,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("resolver", &self.resolver)
            .field("count", &self.records.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl FavoritesStore {
    /// Open the store over `storage` with the positional resolver and load
    /// whatever is persisted.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_resolver(storage, IdResolver::Positional)
    }

    pub fn with_resolver(storage: Arc<dyn KeyValueStore>, resolver: IdResolver) -> Self {
        let mut store = Self {
            storage,
            resolver,
            ids: HashSet::new(),
            records: Vec::new(),
            dirty: false,
        };
        store.load();
        store
    }

    /// Replace in-memory state with the persisted favorites.
    ///
    /// A missing key counts as empty. An unreadable or unparsable value
    /// empties the store and is logged; it never reaches the caller.
    pub fn load(&mut self) {
        self.ids.clear();
        self.records.clear();

        let (ids, records) = match read_persisted(self.storage.as_ref()) {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!("Failed to load favorites, starting empty: {}", e);
                return;
            }
        };

        let wanted: HashSet<&str> = ids.iter().map(FavoriteId::as_str).collect();
        let record_count = records.len();
        for (position, mut record) in records.into_iter().enumerate() {
            // Records saved without an id were keyed by the resolver at
            // their list position.
            let id = match native_id(&record) {
                Some(id) => id,
                None => {
                    let id = self.resolver.resolve(&record, Some(position));
                    if wanted.contains(id.as_str()) {
                        record.id = Some(NativeId::Text(id.to_string()));
                    }
                    id
                }
            };
            if wanted.contains(id.as_str()) && self.ids.insert(id) {
                self.records.push(record);
            }
        }

        let dropped_records = record_count - self.records.len();
        let orphaned_ids = wanted.len() - self.records.len();
        if dropped_records > 0 || orphaned_ids > 0 {
            tracing::warn!(
                "Repaired persisted favorites: dropped {} records and {} ids without a counterpart",
                dropped_records,
                orphaned_ids
            );
        }
    }

    pub fn reload(&mut self) {
        self.load();
    }

    /// Reload after another writer touched the favorites keys.
    /// Returns true if a reload happened.
    pub fn apply_change(&mut self, change: &StorageChange) -> bool {
        if !change.affects_favorites() {
            return false;
        }
        self.reload();
        true
    }

    /// Identifier the store uses for `record` shown at `index`.
    pub fn resolve(&self, record: &IconRecord, index: Option<usize>) -> FavoriteId {
        self.resolver.resolve(record, index)
    }

    pub fn is_favorite(&self, record: &IconRecord, index: Option<usize>) -> bool {
        self.contains(self.resolve(record, index).as_str())
    }

    pub fn add(&mut self, record: IconRecord) -> Change {
        self.add_at(record, None)
    }

    /// Add `record`, resolving its identifier with the list position `index`.
    pub fn add_at(&mut self, record: IconRecord, index: Option<usize>) -> Change {
        let id = self.resolve(&record, index);
        if self.ids.contains(&id) {
            return Change::Unchanged(id);
        }
        self.insert(id, record)
    }

    pub fn remove(&mut self, id: &str) -> Change {
        if !self.ids.remove(id) {
            return Change::Unchanged(FavoriteId::from(id));
        }
        self.records
            .retain(|r| native_id(r).as_ref().map(FavoriteId::as_str) != Some(id));
        self.persist();
        Change::Removed(FavoriteId::from(id))
    }

    pub fn toggle(&mut self, record: IconRecord) -> Change {
        self.toggle_at(record, None)
    }

    pub fn toggle_at(&mut self, record: IconRecord, index: Option<usize>) -> Change {
        let id = self.resolve(&record, index);
        if self.ids.contains(&id) {
            self.remove(id.as_str())
        } else {
            self.insert(id, record)
        }
    }

    /// Remove every favorite. Returns true if anything was removed.
    pub fn clear(&mut self) -> bool {
        if self.records.is_empty() {
            return false;
        }
        self.ids.clear();
        self.records.clear();
        self.persist();
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Favorite records in the order they were added.
    pub fn records(&self) -> &[IconRecord] {
        &self.records
    }

    /// Favorite identifiers in the order they were added.
    pub fn ids(&self) -> Vec<FavoriteId> {
        self.records.iter().filter_map(native_id).collect()
    }

    pub fn get(&self, id: &str) -> Option<&IconRecord> {
        if !self.contains(id) {
            return None;
        }
        self.records
            .iter()
            .find(|r| native_id(r).as_ref().map(FavoriteId::as_str) == Some(id))
    }

    /// True while the last write-through failed. In-memory state is still
    /// authoritative and the next successful write clears this.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn insert(&mut self, id: FavoriteId, mut record: IconRecord) -> Change {
        // Stamp synthesized ids so later resolution is position independent.
        if native_id(&record).is_none() {
            record.id = Some(NativeId::Text(id.to_string()));
        }
        self.ids.insert(id.clone());
        self.records.push(record);
        self.persist();
        Change::Added(id)
    }

    fn persist(&mut self) {
        let result = self.encode().and_then(|(ids, records)| {
            self.storage
                .set_many(&[
                    (FAVORITE_IDS_KEY, ids.as_str()),
                    (FAVORITE_RECORDS_KEY, records.as_str()),
                ])
        });
        match result {
            Ok(()) => self.dirty = false,
            Err(e) => {
                tracing::error!("Failed to persist favorites: {}", e);
                self.dirty = true;
            }
        }
    }

    fn encode(&self) -> Result<(String, String), StorageError> {
        let ids = serde_json::to_string(&self.ids())?;
        let records = serde_json::to_string(&self.records)?;
        Ok((ids, records))
    }
}

fn read_persisted(
    storage: &dyn KeyValueStore,
) -> Result<(Vec<FavoriteId>, Vec<IconRecord>), StorageError> {
    let ids = match storage.get(FAVORITE_IDS_KEY)? {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Vec::new(),
    };
    let records = match storage.get(FAVORITE_RECORDS_KEY)? {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Vec::new(),
    };
    Ok((ids, records))
}
