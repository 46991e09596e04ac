use std::collections::HashMap;
use std::time::Duration;

use history_types::ports::storage::{StorageBackend, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Persistence rules for one key.
///
/// `dual_write` keys are cookie-primary: typed reads come from the cookie
/// store and every write refreshes the cookie copy with `cookie_ttl`. Keys
/// with `delete_on_empty` drop the entry when the serialized value is an
/// empty collection; all others keep the key present with `[]`.
#[derive(Debug, Clone)]
pub struct KeyPolicy {
    pub dual_write: bool,
    pub delete_on_empty: bool,
    pub cookie_ttl: Option<Duration>,
}

impl KeyPolicy {
    pub fn durable_only() -> Self {
        Self {
            dual_write: false,
            delete_on_empty: false,
            cookie_ttl: None,
        }
    }

    pub fn cookie_backed(ttl: Duration) -> Self {
        Self {
            dual_write: true,
            delete_on_empty: false,
            cookie_ttl: Some(ttl),
        }
    }

    pub fn cookie_backed_days(days: u64) -> Self {
        Self::cookie_backed(Duration::from_secs(days * 24 * 60 * 60))
    }
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self::durable_only()
    }
}

/// Key-to-policy map; unlisted keys fall back to durable-only storage.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    entries: HashMap<String, KeyPolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, key: impl Into<String>, policy: KeyPolicy) -> Self {
        self.entries.insert(key.into(), policy);
        self
    }

    pub fn policy_for(&self, key: &str) -> KeyPolicy {
        self.entries.get(key).cloned().unwrap_or_default()
    }
}

/// Key-value layer over the two client stores.
///
/// Reads prefer the small expiry-aware cookie store and fall back to the
/// durable one; writes go to the durable store always and to the cookie store
/// for dual-write keys. The redundancy exists so the most valuable state
/// survives either store being wiped.
///
/// No operation logs; callers decide how loud a failure is.
pub struct PersistedStore<C, D> {
    cookie: C,
    durable: D,
    policies: PolicyTable,
}

impl<C, D> PersistedStore<C, D>
where
    C: StorageBackend,
    D: StorageBackend,
{
    pub fn new(cookie: C, durable: D, policies: PolicyTable) -> Self {
        Self {
            cookie,
            durable,
            policies,
        }
    }

    /// Raw lookup: cookie store first, durable store as fallback.
    pub async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        if let Some(value) = self.cookie.get(key).await? {
            return Ok(Some(value));
        }
        self.durable.get(key).await
    }

    /// Typed lookup from the key's primary store. `Ok(None)` means absent;
    /// unparseable text is an error, which callers usually downgrade to their
    /// initial value.
    pub async fn read_typed<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let policy = self.policies.policy_for(key);
        let raw = if policy.dual_write {
            self.cookie.get(key).await?
        } else {
            self.durable.get(key).await?
        };
        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StoreError::Serde(e.to_string())),
            None => Ok(None),
        }
    }

    /// Serializes `value` once and writes it per the key's policy. An empty
    /// collection stays present as `[]` unless the policy says to delete it.
    pub async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let policy = self.policies.policy_for(key);
        let text = serde_json::to_string(value).map_err(|e| StoreError::Serde(e.to_string()))?;

        if policy.delete_on_empty && text == "[]" {
            return self.remove(key).await;
        }
        if policy.dual_write {
            self.cookie.set(key, &text, policy.cookie_ttl).await?;
        }
        self.durable.set(key, &text, None).await
    }

    /// Removes the key from both stores.
    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.cookie.remove(key).await?;
        self.durable.remove(key).await?;
        Ok(())
    }
}
