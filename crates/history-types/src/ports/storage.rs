use std::time::Duration;

use async_trait::async_trait;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

/// Key-value storage port. Implemented by the cookie jar and by the durable
/// backends; the application layer never sees a concrete store.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores a value. Backends without expiry support ignore `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Removes the entry, reporting whether one was present.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}
