use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Storage key for the persisted order history. The only key with dual-store,
/// never-delete-on-empty write semantics.
pub const ORDER_HISTORY_KEY: &str = "restaurant_order_history";

/// Storage key for the per-installation device identity.
pub const DEVICE_ID_KEY: &str = "restaurant_device_id";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

/// One entry of the persisted order history.
///
/// Only `id`, `isPaid` and `status` are interpreted here. Everything else the
/// ordering front-end stores on an order (table number, line items, totals)
/// is carried in `extra` and written back untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub is_paid: bool,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    pub fn new(id: impl Into<String>) -> anyhow::Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            anyhow::bail!("order id empty");
        }
        Ok(Self {
            id,
            is_paid: false,
            status: OrderStatus::Pending,
            extra: Map::new(),
        })
    }

    pub fn with_generated_id() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            is_paid: false,
            status: OrderStatus::Pending,
            extra: Map::new(),
        }
    }

    /// Settles the order: paid, and its lifecycle is over.
    pub fn mark_paid(&mut self) {
        self.is_paid = true;
        self.status = OrderStatus::Completed;
    }
}
