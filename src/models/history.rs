use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One product's stock movement record for a single ISO week.
///
/// At most one entry exists per (product, ISO week). `week_start_date`
/// is the Monday of the week at UTC midnight on the wire;
/// `services::week::week_start_utc` produces the canonical value before
/// anything is sent to the store. `id` is absent until the store has
/// persisted the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub product_id: i64,
    pub week_start_date: DateTime<Utc>,
    pub received_quantity: f64,
    pub sold_quantity: f64,
    pub unsold_quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: String,
}
