#![cfg(feature = "sqlite")]

use history_store::sqlite::SqliteStore;
use history_types::ports::storage::StorageBackend;
use std::path::PathBuf;
use uuid::Uuid;

fn temp_db_url() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut path = PathBuf::from(dir.path());
    path.push(format!("history-{}.db", Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());
    (dir, url)
}

#[tokio::test]
async fn sqlite_store_kv_flow() {
    let (_dir, url) = temp_db_url();
    let store = SqliteStore::new(&url).await.unwrap();

    store.set("a", "1", None).await.unwrap();
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));

    store.set("a", "2", None).await.unwrap();
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("2"));

    assert!(store.remove("a").await.unwrap());
    assert!(store.get("a").await.unwrap().is_none());
    assert!(!store.remove("a").await.unwrap());
}

#[tokio::test]
async fn sqlite_store_survives_reconnect() {
    let (_dir, url) = temp_db_url();
    {
        let store = SqliteStore::new(&url).await.unwrap();
        store.set("history", "[]", None).await.unwrap();
    }

    let reopened = SqliteStore::new(&url).await.unwrap();
    assert_eq!(
        reopened.get("history").await.unwrap().as_deref(),
        Some("[]")
    );
}

#[tokio::test]
async fn sqlite_store_handles_missing_keys() {
    let (_dir, url) = temp_db_url();
    let store = SqliteStore::new(&url).await.unwrap();
    assert!(store.get("missing").await.unwrap().is_none());
    assert!(!store.remove("missing").await.unwrap());
}
