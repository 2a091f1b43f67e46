// src/dtos/ledger.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::history::HistoryEntry;
use crate::models::product::Product;

// ==================== Ledger view ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    pub week: String,
    pub week_start_date: DateTime<Utc>,
    pub lines: Vec<LedgerLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerLine {
    pub product_id: i64,
    pub product_name: String,
    pub category_name: String,
    pub unit: String,
    pub received_quantity: f64,
    pub sold_quantity: f64,
    pub unsold_quantity: f64,
    pub price: Option<f64>,
    pub description: String,
    /// Whether the store already holds a row for this week.
    pub persisted: bool,
}

impl LedgerLine {
    pub fn from_entry(product: &Product, category_name: String, entry: &HistoryEntry) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            category_name,
            unit: product.unit.as_str().to_string(),
            received_quantity: entry.received_quantity,
            sold_quantity: entry.sold_quantity,
            unsold_quantity: entry.unsold_quantity,
            price: entry.price,
            description: entry.description.clone(),
            persisted: entry.id.is_some(),
        }
    }
}

// ==================== Ledger save ====================

/// Form-style save payload: one row per product the user touched.
/// Numeric fields arrive as the raw input strings; coercion happens in
/// `LedgerSession::edit`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLedgerRequest {
    pub lines: Vec<SaveLedgerLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLedgerLine {
    pub product_id: i64,
    pub received_quantity: String,
    pub sold_quantity: String,
    pub unsold_quantity: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    pub modified: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLedgerResponse {
    pub created: usize,
    pub updated: usize,
    /// Modified rows the zero-received guard kept out of the batch.
    pub skipped: usize,
}
