// src/dtos/reconciliation.rs
use serde::{Deserialize, Serialize};

use crate::models::order::OrderItemRef;
use crate::services::reconcile::EditedItem;

// ==================== Reconcile request ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOrderRequest {
    pub items: Vec<EditedItemRequest>,
    /// Ids the client removed while editing, tracked at removal time.
    #[serde(default)]
    pub deleted_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedItemRequest {
    #[serde(rename = "ref")]
    pub item_ref: OrderItemRef,
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: f64,
    pub unit: String,
}

impl From<EditedItemRequest> for EditedItem {
    fn from(req: EditedItemRequest) -> Self {
        Self {
            item_ref: req.item_ref,
            product_id: req.product_id,
            quantity: req.quantity,
            unit_price: req.unit_price,
            unit: req.unit,
        }
    }
}

// ==================== Reconcile response ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOrderResponse {
    pub order_id: i64,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub total_amount: f64,
}
