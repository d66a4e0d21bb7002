//! Session-scoped storage facility and the [`Store`] adapter over it

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::Store;
use crate::error::{AuthError, Result};

/// A synchronous, session-scoped key-value facility
///
/// This is the shape of the browser's `sessionStorage`: string keys, string
/// values, and entries that disappear with the session.
pub trait SessionStorage: Send + Sync {
    /// Get the item stored under `key`
    ///
    /// # Errors
    /// Returns an error if the facility cannot be read
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`
    ///
    /// # Errors
    /// Returns an error if the facility refuses the write (e.g. quota)
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the item stored under `key`
    ///
    /// # Errors
    /// Returns an error if the facility cannot be written
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Number of items in the session
    ///
    /// # Errors
    /// Returns an error if the facility cannot be read
    fn len(&self) -> Result<usize>;

    /// Whether the session holds no items
    ///
    /// # Errors
    /// Returns an error if the facility cannot be read
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every item in the session
    ///
    /// # Errors
    /// Returns an error if the facility cannot be written
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default)]
struct SessionState {
    items: HashMap<String, String>,
    used_bytes: usize,
}

/// In-process session storage
///
/// Clones share the same session. Dropping the last clone ends the session.
/// An optional quota caps the total bytes held (keys plus values); a write
/// that would exceed it fails and leaves the previous value in place.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    state: Arc<Mutex<SessionState>>,
    quota: Option<usize>,
}

impl MemorySessionStorage {
    /// Create an empty session with no quota
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session limited to `quota` bytes
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            state: Arc::default(),
            quota: Some(quota),
        }
    }

    /// Configured quota, if any
    #[must_use]
    pub fn quota(&self) -> Option<usize> {
        self.quota
    }

    /// Bytes currently held by the session
    ///
    /// # Errors
    /// Returns an error if the session lock is poisoned
    pub fn used_bytes(&self) -> Result<usize> {
        Ok(self.lock()?.used_bytes)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SessionState>> {
        self.state
            .lock()
            .map_err(|_| AuthError::storage("session storage lock poisoned"))
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.lock()?;

        let previous = state
            .items
            .get(key)
            .map_or(0, |old| key.len() + old.len());
        let needed = state.used_bytes - previous + key.len() + value.len();

        if let Some(quota) = self.quota {
            if needed > quota {
                return Err(AuthError::quota_exceeded(needed, quota));
            }
        }

        state.items.insert(key.to_string(), value.to_string());
        state.used_bytes = needed;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut state = self.lock()?;
        if let Some(old) = state.items.remove(key) {
            state.used_bytes -= key.len() + old.len();
        }
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.lock()?.items.len())
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.items.clear();
        state.used_bytes = 0;
        Ok(())
    }
}

/// [`Store`] backed by a session-scoped facility
///
/// Each call goes straight to the facility. Errors are passed through as
/// raised.
#[derive(Debug, Clone, Default)]
pub struct SessionStore<S = MemorySessionStorage> {
    storage: S,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Wrap a session storage facility
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get the underlying facility
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[async_trait]
impl<S: SessionStorage> Store for SessionStore<S> {
    async fn set_data(&self, key: &str, value: &str) -> Result<()> {
        tracing::trace!(key, "session store: set");
        self.storage.set_item(key, value)
    }

    async fn get_data(&self, key: &str) -> Result<Option<String>> {
        tracing::trace!(key, "session store: get");
        self.storage.get_item(key)
    }

    async fn remove_data(&self, key: &str) -> Result<()> {
        tracing::trace!(key, "session store: remove");
        self.storage.remove_item(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemorySessionStorage::new();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.get_item("a").unwrap(), Some("1".to_string()));
        assert_eq!(storage.len().unwrap(), 1);

        storage.remove_item("a").unwrap();
        assert_eq!(storage.get_item("a").unwrap(), None);
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let storage = MemorySessionStorage::new();
        storage.set_item("k", "first").unwrap();
        storage.set_item("k", "second").unwrap();
        assert_eq!(storage.len().unwrap(), 1);
        assert_eq!(storage.get_item("k").unwrap(), Some("second".to_string()));
        assert_eq!(storage.used_bytes().unwrap(), "k".len() + "second".len());
    }

    #[test]
    fn test_remove_absent_key_is_ok() {
        let storage = MemorySessionStorage::new();
        assert!(storage.remove_item("missing").is_ok());
        assert_eq!(storage.used_bytes().unwrap(), 0);
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_value() {
        let storage = MemorySessionStorage::with_quota(10);
        storage.set_item("key", "val").unwrap();

        let err = storage.set_item("key", "much too long").unwrap_err();
        assert!(matches!(
            err,
            AuthError::QuotaExceeded {
                needed: 16,
                quota: 10
            }
        ));
        assert_eq!(storage.get_item("key").unwrap(), Some("val".to_string()));
        assert_eq!(storage.used_bytes().unwrap(), 6);
    }

    #[test]
    fn test_overwrite_within_quota_counts_replacement() {
        // 3 + 7 = 10 fits exactly once the old value is discounted
        let storage = MemorySessionStorage::with_quota(10);
        storage.set_item("key", "1234567").unwrap();
        storage.set_item("key", "abcdefg").unwrap();
        assert_eq!(storage.used_bytes().unwrap(), 10);
    }

    #[test]
    fn test_clones_share_session() {
        let tab = MemorySessionStorage::new();
        let same_tab = tab.clone();
        let other_tab = MemorySessionStorage::new();

        tab.set_item("k", "v").unwrap();
        assert_eq!(same_tab.get_item("k").unwrap(), Some("v".to_string()));
        assert_eq!(other_tab.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let storage = MemorySessionStorage::new();
        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();
        storage.clear().unwrap();
        assert!(storage.is_empty().unwrap());
        assert_eq!(storage.used_bytes().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_session_store_delegates() {
        let storage = MemorySessionStorage::new();
        let store = SessionStore::new(storage.clone());

        store.set_data("key", "value").await.unwrap();
        assert_eq!(storage.get_item("key").unwrap(), Some("value".to_string()));
        assert_eq!(store.get_data("key").await.unwrap(), Some("value".to_string()));

        store.remove_data("key").await.unwrap();
        assert_eq!(store.get_data("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_store_propagates_quota_error() {
        let store = SessionStore::new(MemorySessionStorage::with_quota(4));
        let err = store.set_data("key", "value").await.unwrap_err();
        assert!(matches!(err, AuthError::QuotaExceeded { .. }));
    }
}
