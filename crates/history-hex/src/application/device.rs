use history_types::domain::order::DEVICE_ID_KEY;
use history_types::ports::storage::StorageBackend;
use uuid::Uuid;

use crate::application::persisted_store::PersistedStore;

/// Stable per-installation identity.
///
/// Looks in the cookie store first and falls back to the durable one, so the
/// id survives either store being wiped. A missing or unreadable value mints
/// a fresh UUID and persists it; a failing store yields an ephemeral id
/// rather than an error.
pub async fn device_id<C, D>(store: &PersistedStore<C, D>) -> String
where
    C: StorageBackend,
    D: StorageBackend,
{
    match store.read(DEVICE_ID_KEY).await {
        Ok(Some(raw)) => {
            if let Ok(id) = serde_json::from_str::<String>(&raw) {
                if !id.is_empty() {
                    return id;
                }
            }
            tracing::debug!(key = DEVICE_ID_KEY, "stored device id unreadable, minting a new one");
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(key = DEVICE_ID_KEY, error = %err, "device id lookup failed");
            return Uuid::new_v4().to_string();
        }
    }

    let id = Uuid::new_v4().to_string();
    if let Err(err) = store.write(DEVICE_ID_KEY, &id).await {
        tracing::warn!(key = DEVICE_ID_KEY, error = %err, "could not persist device id");
    }
    id
}
