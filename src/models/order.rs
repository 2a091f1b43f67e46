use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Prepared,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub client_id: Option<i64>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: f64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// An order belongs to exactly one of a customer or a client.
    pub fn has_single_party(&self) -> bool {
        self.customer_id.is_some() != self.client_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: f64,
    pub unit: String,
}

/// Reference to an order line while an order is being edited.
///
/// `Existing` lines live on the store; `New` lines only exist in the
/// edit session and are keyed by an opaque temp key until created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OrderItemRef {
    Existing { id: i64 },
    New { temp_key: String },
}
