use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Mutex, RwLock};

use crate::error::StorageError;

/// Key holding the JSON array of favorite identifiers.
pub const FAVORITE_IDS_KEY: &str = "iconFavorites";
/// Key holding the JSON array of favorite icon records.
pub const FAVORITE_RECORDS_KEY: &str = "favoriteIconsData";

/// Trait for a persisted string key-value medium.
///
/// Serialization is the caller's concern; implementations only move strings.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns Ok(None) if the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Returns Ok(true) if the key existed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// Write several keys together.
    /// The default writes them one by one; transactional backends should
    /// override this so that readers never observe a partial update.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Process-local store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.write().map_err(poisoned)?.remove(key).is_some())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.entries.write().map_err(poisoned)?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Notification that a key was written or removed through a [`NotifyingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
}

impl StorageChange {
    /// Whether this change touches one of the favorites keys.
    pub fn affects_favorites(&self) -> bool {
        self.key == FAVORITE_IDS_KEY || self.key == FAVORITE_RECORDS_KEY
    }
}

/// Wraps a store and tells every subscriber about each successful write.
///
/// Several consumers sharing one medium use this to notice each other's
/// writes. Delivery is best-effort and carries only the key, so receivers
/// re-read the value themselves.
#[derive(Debug)]
pub struct NotifyingStore<S> {
    inner: S,
    subscribers: Mutex<Vec<Sender<StorageChange>>>,
}

impl<S: KeyValueStore> NotifyingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Register a new subscriber. Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> Receiver<StorageChange> {
        let (tx, rx) = channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn notify(&self, key: &str) {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            tracing::warn!("Change subscribers unavailable, dropping notification for {}", key);
            return;
        };
        let change = StorageChange {
            key: key.to_string(),
        };
        subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

impl<S: KeyValueStore> KeyValueStore for NotifyingStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)?;
        self.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let existed = self.inner.remove(key)?;
        if existed {
            self.notify(key);
        }
        Ok(existed)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.inner.set_many(entries)?;
        for (key, _) in entries {
            self.notify(key);
        }
        Ok(())
    }
}
