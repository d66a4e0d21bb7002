//! Integration tests for the session-backed store
//!
//! Covers the store contract through trait objects and error propagation
//! from a facility that refuses writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use spa_auth::{AuthError, MemorySessionStorage, SessionStorage, SessionStore, Store};

/// Facility that counts calls and refuses every write
#[derive(Default)]
struct ReadOnlyStorage {
    calls: AtomicU32,
}

impl SessionStorage for ReadOnlyStorage {
    fn get_item(&self, _key: &str) -> spa_auth::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    fn set_item(&self, _key: &str, _value: &str) -> spa_auth::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AuthError::storage("session storage is disabled"))
    }

    fn remove_item(&self, _key: &str) -> spa_auth::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AuthError::storage("session storage is disabled"))
    }

    fn len(&self) -> spa_auth::Result<usize> {
        Ok(0)
    }

    fn clear(&self) -> spa_auth::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_store_contract_through_arc_dyn() {
    let store: Arc<dyn Store> = Arc::new(SessionStore::new(MemorySessionStorage::new()));

    assert_eq!(store.get_data("missing").await.unwrap(), None);

    store.set_data("k", "v1").await.unwrap();
    store.set_data("k", "v2").await.unwrap();
    assert_eq!(store.get_data("k").await.unwrap().as_deref(), Some("v2"));

    store.remove_data("k").await.unwrap();
    store.remove_data("k").await.unwrap();
    assert_eq!(store.get_data("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_store_contract_through_box_dyn() {
    let store: Box<dyn Store> = Box::new(SessionStore::new(MemorySessionStorage::new()));
    store.set_data("", "").await.unwrap();
    assert_eq!(store.get_data("").await.unwrap().as_deref(), Some(""));
}

#[tokio::test]
async fn test_values_are_stored_verbatim() {
    let store = SessionStore::new(MemorySessionStorage::new());
    let value = r#"{"nested":"json","emoji":"🔑","newline":"a\nb"}"#;
    store.set_data("record", value).await.unwrap();
    assert_eq!(store.get_data("record").await.unwrap().as_deref(), Some(value));
}

#[tokio::test]
async fn test_facility_errors_pass_through() {
    let store = SessionStore::new(ReadOnlyStorage::default());

    let err = store.set_data("k", "v").await.unwrap_err();
    assert!(matches!(err, AuthError::Storage(ref msg) if msg == "session storage is disabled"));
    assert!(store.remove_data("k").await.is_err());
    assert_eq!(store.get_data("k").await.unwrap(), None);

    // One facility call per store call, no retries
    assert_eq!(store.storage().calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_quota_error_surfaces_with_sizes() {
    let store = SessionStore::new(MemorySessionStorage::with_quota(16));
    store.set_data("a", "small").await.unwrap();

    let err = store.set_data("b", "this value is too big").await.unwrap_err();
    match err {
        AuthError::QuotaExceeded { needed, quota } => {
            assert_eq!(quota, 16);
            assert_eq!(needed, 1 + 5 + 1 + 21);
        }
        other => panic!("expected quota error, got {other:?}"),
    }
    assert_eq!(store.get_data("b").await.unwrap(), None);
    assert_eq!(store.get_data("a").await.unwrap().as_deref(), Some("small"));
}

#[tokio::test]
async fn test_concurrent_writers_share_one_session() {
    let storage = MemorySessionStorage::new();
    let store: Arc<dyn Store> = Arc::new(SessionStore::new(storage.clone()));

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .set_data(&format!("key-{i}"), &i.to_string())
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(storage.len().unwrap(), 16);
    assert_eq!(store.get_data("key-7").await.unwrap().as_deref(), Some("7"));
}
