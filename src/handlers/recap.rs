// src/handlers/recap.rs
use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Duration;
use tracing::instrument;

use crate::dtos::recap::{ProducerRecapResponse, ProductRecapResponse};
use crate::error::AppError;
use crate::models::product::{Producer, Product};
use crate::services::{recap, week};
use crate::state::AppState;

// ==================== Product Recap ====================

#[instrument(skip(state))]
pub async fn product_recap(
    State(state): State<AppState>,
    Path(week_label): Path<String>,
) -> Result<Json<ProductRecapResponse>, AppError> {
    let monday = week::parse_week_label(&week_label)?;
    let sunday = monday + Duration::days(6);

    let orders = state.store.list_orders().await?;
    let products: HashMap<i64, Product> = state
        .store
        .list_products()
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let lines = recap::aggregate_by_product_unit(&orders, &products, monday, sunday);

    Ok(Json(ProductRecapResponse {
        week: week::week_label(monday),
        lines,
    }))
}

// ==================== Producer Recap ====================

#[instrument(skip(state))]
pub async fn producer_recap(
    State(state): State<AppState>,
    Path(week_label): Path<String>,
) -> Result<Json<ProducerRecapResponse>, AppError> {
    let monday = week::parse_week_label(&week_label)?;
    let sunday = monday + Duration::days(6);

    let orders = state.store.list_orders().await?;
    let products: HashMap<i64, Product> = state
        .store
        .list_products()
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let producers: HashMap<i64, Producer> = state
        .store
        .list_producers()
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let grouped = recap::aggregate_by_producer(&orders, &products, &producers, monday, sunday);

    Ok(Json(ProducerRecapResponse {
        week: week::week_label(monday),
        producers: grouped,
    }))
}
