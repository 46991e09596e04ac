use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use history_types::ports::storage::{StorageBackend, StoreError};

/// Expiry-aware in-process store modelled on a browser cookie jar: small
/// values, optional TTL per entry, expired entries read as absent.
#[derive(Clone, Default)]
pub struct CookieJar {
    entries: Arc<DashMap<String, CookieEntry>>,
}

#[derive(Clone)]
struct CookieEntry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CookieEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sweeps expired entries, returning how many were dropped. Reads already
    /// treat expired entries as absent; this just reclaims the slots.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl StorageBackend for CookieJar {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Utc::now();
        match self.entries.get(key) {
            Some(entry) if entry.is_expired(now) => {}
            Some(entry) => return Ok(Some(entry.value.clone())),
            None => return Ok(None),
        }
        // Guard dropped above; evict the stale entry.
        self.entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        // A TTL too large for the calendar means the entry never expires.
        let expires_at = ttl
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .and_then(|delta| Utc::now().checked_add_signed(delta));
        self.entries.insert(
            key.to_string(),
            CookieEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }
}
