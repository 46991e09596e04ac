use history_types::domain::order::{Order, ORDER_HISTORY_KEY};
use history_types::ports::storage::StorageBackend;

use crate::application::persisted_store::PersistedStore;

/// Order-history operations over the persisted store.
///
/// Every public operation absorbs storage and parse failures: they are logged
/// with the failing key and the caller sees a safe default instead. The
/// history is a convenience cache; losing an update must never take the
/// ordering flow down with it.
pub struct HistoryService<C, D> {
    store: PersistedStore<C, D>,
    key: String,
}

impl<C, D> HistoryService<C, D>
where
    C: StorageBackend,
    D: StorageBackend,
{
    /// The store is expected to carry a cookie-backed policy for
    /// [`ORDER_HISTORY_KEY`]; without one the history degrades to
    /// durable-only storage.
    pub fn new(store: PersistedStore<C, D>) -> Self {
        Self {
            store,
            key: ORDER_HISTORY_KEY.to_string(),
        }
    }

    /// The current history; absent or malformed state reads as empty.
    pub async fn load(&self) -> Vec<Order> {
        match self.store.read_typed(&self.key).await {
            Ok(Some(history)) => history,
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "unreadable order history, starting empty");
                Vec::new()
            }
        }
    }

    pub async fn find(&self, order_id: &str) -> Option<Order> {
        self.load().await.into_iter().find(|o| o.id == order_id)
    }

    /// Appends an order to the history and persists it.
    pub async fn record(&self, order: Order) -> Order {
        let mut history = self.load().await;
        history.push(order.clone());
        self.persist(&history).await;
        order
    }

    /// Marks every order with this id as paid and completed. A history that
    /// was never persisted (or cannot be parsed) is left untouched; the
    /// payment flow must not conjure state out of nothing.
    pub async fn mark_paid(&self, order_id: &str) {
        let history = match self.store.read_typed::<Vec<Order>>(&self.key).await {
            Ok(Some(history)) => history,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "unreadable order history, skipping payment update");
                return;
            }
        };

        let updated: Vec<Order> = history
            .into_iter()
            .map(|mut order| {
                if order.id == order_id {
                    order.mark_paid();
                }
                order
            })
            .collect();
        self.persist(&updated).await;
    }

    /// Initializes an empty history when none is persisted yet. A present
    /// value, even one that no longer parses, is left as is.
    pub async fn ensure_persistence(&self) {
        match self.store.read_typed::<Vec<Order>>(&self.key).await {
            Ok(None) => self.persist(&[]).await,
            Ok(Some(_)) => {}
            Err(err) => {
                tracing::debug!(key = %self.key, error = %err, "order history present but unreadable, leaving it");
            }
        }
    }

    /// Drops the history from both stores entirely.
    pub async fn clear(&self) {
        if let Err(err) = self.store.remove(&self.key).await {
            tracing::warn!(key = %self.key, error = %err, "could not clear order history");
            return;
        }
        tracing::info!(key = %self.key, "order history cleared");
    }

    async fn persist(&self, history: &[Order]) {
        if let Err(err) = self.store.write(&self.key, history).await {
            tracing::warn!(key = %self.key, error = %err, "could not persist order history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::persisted_store::{KeyPolicy, PolicyTable};
    use history_store::memory::MemoryStore;
    use history_store::CookieJar;
    use history_types::domain::order::OrderStatus;

    fn service(
        jar: &CookieJar,
        durable: &MemoryStore,
    ) -> HistoryService<CookieJar, MemoryStore> {
        let policies = PolicyTable::new()
            .with_policy(ORDER_HISTORY_KEY, KeyPolicy::cookie_backed_days(30));
        HistoryService::new(PersistedStore::new(jar.clone(), durable.clone(), policies))
    }

    fn pending(id: &str) -> Order {
        Order::new(id).unwrap()
    }

    #[tokio::test]
    async fn mark_paid_settles_only_the_matching_order() {
        let jar = CookieJar::new();
        let durable = MemoryStore::new();
        let svc = service(&jar, &durable);

        svc.record(pending("A")).await;
        svc.record(pending("B")).await;
        svc.mark_paid("A").await;

        let history = svc.load().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, "A");
        assert!(history[0].is_paid);
        assert_eq!(history[0].status, OrderStatus::Completed);
        assert_eq!(history[1].id, "B");
        assert!(!history[1].is_paid);
        assert_eq!(history[1].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn mark_paid_preserves_order_and_unknown_fields() {
        let jar = CookieJar::new();
        let durable = MemoryStore::new();
        let svc = service(&jar, &durable);

        let mut first = pending("A");
        first
            .extra
            .insert("table".into(), serde_json::json!(12));
        svc.record(first).await;
        svc.record(pending("B")).await;

        svc.mark_paid("A").await;

        let history = svc.load().await;
        assert_eq!(history[0].extra.get("table"), Some(&serde_json::json!(12)));
        assert_eq!(history[0].id, "A");
        assert_eq!(history[1].id, "B");
    }

    #[tokio::test]
    async fn mark_paid_is_idempotent() {
        let jar = CookieJar::new();
        let durable = MemoryStore::new();
        let svc = service(&jar, &durable);

        svc.record(pending("A")).await;
        svc.mark_paid("A").await;
        let once = svc.load().await;
        svc.mark_paid("A").await;
        assert_eq!(svc.load().await, once);
    }

    #[tokio::test]
    async fn mark_paid_with_no_match_changes_nothing() {
        let jar = CookieJar::new();
        let durable = MemoryStore::new();
        let svc = service(&jar, &durable);

        svc.record(pending("A")).await;
        let before = svc.load().await;
        svc.mark_paid("does-not-exist").await;
        assert_eq!(svc.load().await, before);
    }

    #[tokio::test]
    async fn mark_paid_without_history_writes_nothing() {
        let jar = CookieJar::new();
        let durable = MemoryStore::new();
        let svc = service(&jar, &durable);

        svc.mark_paid("A").await;

        use history_types::ports::storage::StorageBackend;
        assert!(jar.get(ORDER_HISTORY_KEY).await.unwrap().is_none());
        assert!(durable.get(ORDER_HISTORY_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_history_blocks_payment_updates() {
        let jar = CookieJar::new();
        let durable = MemoryStore::new();
        let svc = service(&jar, &durable);

        use history_types::ports::storage::StorageBackend;
        jar.set(ORDER_HISTORY_KEY, "{broken", None).await.unwrap();
        svc.mark_paid("A").await;

        // The broken text is left for a later write to replace.
        assert_eq!(
            jar.get(ORDER_HISTORY_KEY).await.unwrap().as_deref(),
            Some("{broken")
        );
        assert!(svc.load().await.is_empty());
    }

    #[tokio::test]
    async fn ensure_persistence_initializes_once() {
        let jar = CookieJar::new();
        let durable = MemoryStore::new();
        let svc = service(&jar, &durable);

        svc.ensure_persistence().await;

        use history_types::ports::storage::StorageBackend;
        assert_eq!(
            jar.get(ORDER_HISTORY_KEY).await.unwrap().as_deref(),
            Some("[]")
        );

        svc.record(pending("A")).await;
        svc.ensure_persistence().await;
        assert_eq!(svc.load().await.len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_history_from_both_stores() {
        let jar = CookieJar::new();
        let durable = MemoryStore::new();
        let svc = service(&jar, &durable);

        svc.record(pending("A")).await;
        svc.clear().await;

        use history_types::ports::storage::StorageBackend;
        assert!(jar.get(ORDER_HISTORY_KEY).await.unwrap().is_none());
        assert!(durable.get(ORDER_HISTORY_KEY).await.unwrap().is_none());

        // Clearing again is a quiet no-op.
        svc.clear().await;
        assert!(svc.load().await.is_empty());
    }

    #[tokio::test]
    async fn record_appends_in_insertion_order() {
        let jar = CookieJar::new();
        let durable = MemoryStore::new();
        let svc = service(&jar, &durable);

        svc.record(pending("first")).await;
        svc.record(pending("second")).await;
        svc.record(pending("third")).await;

        let ids: Vec<String> = svc.load().await.into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn find_matches_by_id() {
        let jar = CookieJar::new();
        let durable = MemoryStore::new();
        let svc = service(&jar, &durable);

        svc.record(pending("A")).await;
        assert_eq!(svc.find("A").await.map(|o| o.id), Some("A".to_string()));
        assert!(svc.find("Z").await.is_none());
    }
}
