#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a durable-store feature: `memory` or `sqlite`.");

use std::time::Duration;

use history_types::ports::storage::{StorageBackend, StoreError};

pub mod cookie;
#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use cookie::CookieJar;

/// Durable backend selected by feature flags, behind one concrete type so the
/// binary can hold it without boxing. Sqlite wins when both are enabled.
pub struct Durable {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    memory: memory::MemoryStore,
    #[cfg(feature = "sqlite")]
    sqlite: sqlite::SqliteStore,
}

pub async fn build_durable(url: Option<&str>) -> anyhow::Result<Durable> {
    Durable::build(url).await
}

impl Durable {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build(_: Option<&str>) -> anyhow::Result<Self> {
        Ok(Self {
            memory: memory::MemoryStore::new(),
        })
    }

    #[cfg(feature = "sqlite")]
    pub async fn build(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or("sqlite://history.db");
        let sqlite = sqlite::SqliteStore::new(url).await?;
        Ok(Self { sqlite })
    }
}

#[cfg(all(feature = "memory", not(feature = "sqlite")))]
#[async_trait::async_trait]
impl StorageBackend for Durable {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.memory.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.memory.set(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.memory.remove(key).await
    }
}

#[cfg(feature = "sqlite")]
#[async_trait::async_trait]
impl StorageBackend for Durable {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.sqlite.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.sqlite.set(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.sqlite.remove(key).await
    }
}
