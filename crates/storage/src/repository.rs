use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The independently persisted slots of a portal session.
///
/// Key names match the browser local-storage layout so exported data stays
/// interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    User,
    Bookmarks,
    Feedbacks,
    ViewedItems,
    UserProgress,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::User,
        StorageKey::Bookmarks,
        StorageKey::Feedbacks,
        StorageKey::ViewedItems,
        StorageKey::UserProgress,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::User => "user",
            StorageKey::Bookmarks => "bookmarks",
            StorageKey::Feedbacks => "feedbacks",
            StorageKey::ViewedItems => "viewedItems",
            StorageKey::UserProgress => "userProgress",
        }
    }

    /// Slots wiped on sign-out. The progress ledger is kept.
    #[must_use]
    pub fn is_session_scoped(self) -> bool {
        !matches!(self, StorageKey::UserProgress)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence contract: opaque JSON text stored under a fixed key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for `key`.
    ///
    /// Returns `Ok(None)` when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn save(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the delete.
    async fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn load(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn save(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

/// Holds the active backend behind a trait object for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_key_loads_none() {
        let store = InMemoryStore::new();
        assert!(store.load(StorageKey::Bookmarks).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_and_remove_deletes() {
        let store = InMemoryStore::new();
        store.save(StorageKey::User, "{\"a\":1}").await.unwrap();
        store.save(StorageKey::User, "{\"a\":2}").await.unwrap();
        assert_eq!(
            store.load(StorageKey::User).await.unwrap().as_deref(),
            Some("{\"a\":2}")
        );
        store.remove(StorageKey::User).await.unwrap();
        store.remove(StorageKey::User).await.unwrap();
        assert_eq!(store.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.save(StorageKey::ViewedItems, "[]").await.unwrap();
        assert!(other.load(StorageKey::ViewedItems).await.unwrap().is_some());
    }

    #[test]
    fn progress_ledger_is_not_session_scoped() {
        let scoped: Vec<_> = StorageKey::ALL
            .into_iter()
            .filter(|k| k.is_session_scoped())
            .collect();
        assert_eq!(scoped.len(), 4);
        assert!(!StorageKey::UserProgress.is_session_scoped());
        assert_eq!(StorageKey::ViewedItems.as_str(), "viewedItems");
    }
}
