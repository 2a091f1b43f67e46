// src/handlers/ledger.rs
use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use futures::future::{join_all, BoxFuture, FutureExt};
use tracing::{error, instrument};

use crate::dtos::ledger::{LedgerLine, LedgerResponse, SaveLedgerRequest, SaveLedgerResponse};
use crate::error::AppError;
use crate::models::product::UNKNOWN_NAME;
use crate::services::ledger::{LedgerField, LedgerSession, SavePlan};
use crate::services::week;
use crate::state::AppState;

use super::collect_batch;

// ==================== Get Ledger ====================

#[instrument(skip(state))]
pub async fn get_ledger(
    State(state): State<AppState>,
    Path(week_label): Path<String>,
) -> Result<Json<LedgerResponse>, AppError> {
    let monday = week::parse_week_label(&week_label)?;

    let products = state.store.list_products().await?;
    let history = state.store.list_history_entries().await?;
    let categories: HashMap<i64, String> = state
        .store
        .list_categories()
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let session = LedgerSession::build(&products, &history, monday, &state.carry_forward_categories);

    let mut lines: Vec<LedgerLine> = products
        .iter()
        .filter(|p| p.is_active)
        .filter_map(|p| {
            let category_name = categories
                .get(&p.category_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string());
            session
                .entry(p.id)
                .map(|entry| LedgerLine::from_entry(p, category_name, entry))
        })
        .collect();
    lines.sort_by(|a, b| a.product_name.to_lowercase().cmp(&b.product_name.to_lowercase()));

    Ok(Json(LedgerResponse {
        week: week::week_label(session.week_monday()),
        week_start_date: week::week_start_utc(session.week_monday()),
        lines,
    }))
}

// ==================== Save Ledger ====================

#[instrument(skip(state, req))]
pub async fn save_ledger(
    State(state): State<AppState>,
    Path(week_label): Path<String>,
    Json(req): Json<SaveLedgerRequest>,
) -> Result<Json<SaveLedgerResponse>, AppError> {
    let monday = week::parse_week_label(&week_label)?;

    // Rebuild from store state first so rows that already exist carry
    // their ids into the plan.
    let products = state.store.list_products().await?;
    let history = state.store.list_history_entries().await?;
    let mut session =
        LedgerSession::build(&products, &history, monday, &state.carry_forward_categories);

    let mut touched = 0usize;
    for line in &req.lines {
        if !line.modified {
            continue;
        }
        touched += 1;
        session.edit(line.product_id, LedgerField::Received, &line.received_quantity)?;
        session.edit(line.product_id, LedgerField::Sold, &line.sold_quantity)?;
        session.edit(line.product_id, LedgerField::Unsold, &line.unsold_quantity)?;
        session.edit(line.product_id, LedgerField::Price, &line.price)?;
        session.edit(line.product_id, LedgerField::Description, &line.description)?;
    }

    let plan = session.plan_save();
    let created = plan.creates.len();
    let updated = plan.updates.len();
    let skipped = touched - plan.len();

    dispatch_history_plan(&state, plan).await?;
    session.clear_modified();

    Ok(Json(SaveLedgerResponse {
        created,
        updated,
        skipped,
    }))
}

/// Creates and updates hit independent rows; fire them as one wave and
/// join before reporting.
async fn dispatch_history_plan(state: &AppState, plan: SavePlan) -> Result<(), AppError> {
    if plan.is_empty() {
        return Ok(());
    }

    let mut ops: Vec<BoxFuture<'static, (String, Result<(), AppError>)>> = Vec::new();

    for entry in plan.creates {
        let store = state.store.clone();
        ops.push(
            async move {
                let label = format!("create history for product {}", entry.product_id);
                let result = store.create_history_entry(&entry).await;
                (label, result)
            }
            .boxed(),
        );
    }
    for entry in plan.updates {
        let Some(id) = entry.id else { continue };
        let store = state.store.clone();
        ops.push(
            async move {
                let result = store.update_history_entry(id, &entry).await;
                (format!("update history {}", id), result)
            }
            .boxed(),
        );
    }

    match collect_batch(join_all(ops).await) {
        Ok(_) => Ok(()),
        Err(err) => {
            error!(%err, "Ledger save batch failed");
            Err(err)
        }
    }
}
