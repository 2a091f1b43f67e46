// src/client/store.rs
use http::StatusCode;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::AppError;
use crate::models::history::HistoryEntry;
use crate::models::order::{Order, OrderStatus};
use crate::models::product::{Category, Producer, Product};

/// Typed client for the remote store API. The store owns persistence
/// and plain CRUD; this service reads whole collections and dispatches
/// the mutation batches its services plan. Token refresh lives with
/// the store's own clients; a configured bearer token is attached
/// verbatim.
#[derive(Clone)]
pub struct StoreClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

// ==================== Mutation bodies ====================

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPatch {
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: f64,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    // ==================== Collections ====================

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.get_json("/products").await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.get_json("/categories").await
    }

    pub async fn list_producers(&self) -> Result<Vec<Producer>, AppError> {
        self.get_json("/producers").await
    }

    pub async fn list_history_entries(&self) -> Result<Vec<HistoryEntry>, AppError> {
        self.get_json("/product-history").await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        self.get_json("/orders").await
    }

    /// The consumed contract has no single-order GET; filter the list.
    pub async fn get_order(&self, id: i64) -> Result<Order, AppError> {
        self.list_orders()
            .await?
            .into_iter()
            .find(|o| o.id == id)
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))
    }

    // ==================== History mutations ====================

    pub async fn create_history_entry(&self, entry: &HistoryEntry) -> Result<(), AppError> {
        self.send_json(Method::POST, "/product-history", entry).await
    }

    pub async fn update_history_entry(&self, id: i64, entry: &HistoryEntry) -> Result<(), AppError> {
        self.send_json(Method::PATCH, &format!("/product-history/{}", id), entry)
            .await
    }

    // ==================== Order mutations ====================

    pub async fn update_order(&self, id: i64, patch: &OrderPatch) -> Result<(), AppError> {
        self.send_json(Method::PATCH, &format!("/orders/{}", id), patch).await
    }

    pub async fn create_order_item(&self, item: &NewOrderItem) -> Result<(), AppError> {
        self.send_json(Method::POST, "/order-item", item).await
    }

    pub async fn update_order_item(&self, id: i64, patch: &OrderItemPatch) -> Result<(), AppError> {
        self.send_json(Method::PATCH, &format!("/order-item/{}", id), patch).await
    }

    pub async fn delete_order_item(&self, id: i64) -> Result<(), AppError> {
        let path = format!("/order-item/{}", id);
        let response = self.request(Method::DELETE, &path).send().await?;
        check(&path, response).await.map(drop)
    }

    // ==================== Plumbing ====================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.request(Method::GET, path).send().await?;
        check(path, response).await?.json::<T>().await.map_err(AppError::from)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), AppError> {
        let response = self.request(method, path).json(body).send().await?;
        check(path, response).await.map(drop)
    }
}

async fn check(path: &str, response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(AppError::not_found(format!("Store has no {}", path)));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(%path, %status, "Store call failed");
        return Err(AppError::upstream(format!("Store {} returned {}: {}", path, status, body)));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::week::week_start_utc;
    use chrono::NaiveDate;

    #[test]
    fn history_create_body_has_no_id_and_utc_midnight_week() {
        let monday = NaiveDate::from_ymd_opt(2025, 7, 28).unwrap();
        let entry = HistoryEntry {
            id: None,
            product_id: 5,
            week_start_date: week_start_utc(monday),
            received_quantity: 3.0,
            sold_quantity: 1.0,
            unsold_quantity: 2.0,
            price: None,
            description: String::new(),
        };

        let body = serde_json::to_value(&entry).unwrap();
        assert!(body.get("id").is_none());
        assert!(body.get("price").is_none());
        assert_eq!(body["productId"], 5);
        assert_eq!(body["weekStartDate"], "2025-07-28T00:00:00Z");
    }

    #[test]
    fn order_patch_serializes_only_set_fields() {
        let patch = OrderPatch {
            total_amount: Some(22.0),
            ..OrderPatch::default()
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, serde_json::json!({ "totalAmount": 22.0 }));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = StoreClient::new("http://store.local/", None);
        assert_eq!(client.base_url, "http://store.local");
    }
}
