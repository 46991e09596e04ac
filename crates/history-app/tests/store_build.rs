use history_store::{build_durable, Durable};
use history_types::domain::order::ORDER_HISTORY_KEY;
use history_types::ports::storage::StorageBackend;
use std::env;

#[tokio::test]
async fn builds_durable_store_from_env() {
    // Use a temp DB path for isolation.
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("history-test.db");
    let url = format!("sqlite://{}", db_path.display());
    env::set_var("DATABASE_URL", &url);

    let store: Durable = build_durable(Some(&url)).await.expect("build durable store");
    // basic sanity: a fresh store holds no history
    let value = store.get(ORDER_HISTORY_KEY).await.expect("get");
    assert!(value.is_none());
}
