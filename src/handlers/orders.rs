// src/handlers/orders.rs
use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::Json;
use futures::future::{join_all, BoxFuture, FutureExt};
use tracing::{error, instrument};

use crate::client::store::{NewOrderItem, OrderItemPatch, OrderPatch};
use crate::dtos::reconciliation::{ReconcileOrderRequest, ReconcileOrderResponse};
use crate::error::AppError;
use crate::models::order::OrderItemRef;
use crate::services::reconcile::{EditedItem, OrderEditSession, ReconciliationPlan};
use crate::state::AppState;

use super::collect_batch;

// ==================== Reconcile Order ====================

#[instrument(skip(state, req))]
pub async fn reconcile_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ReconcileOrderRequest>,
) -> Result<Json<ReconcileOrderResponse>, AppError> {
    let order = state.store.get_order(id).await?;
    if !order.has_single_party() {
        return Err(AppError::validation(format!(
            "Order {} must reference exactly one of customer or client",
            id
        )));
    }

    let products = state.store.list_products().await?;
    let known: HashSet<i64> = products.iter().map(|p| p.id).collect();

    let items: Vec<EditedItem> = req.items.into_iter().map(EditedItem::from).collect();
    let session = OrderEditSession::from_parts(id, items, req.deleted_ids);
    let plan = session.plan(&known)?;

    let created = plan.to_create.len();
    let updated = plan.to_update.len();
    let deleted = plan.to_delete.len();
    let total_amount = plan.total_amount;

    dispatch_reconciliation(&state, id, plan).await?;

    // The order total must track its items on every mutation.
    state
        .store
        .update_order(
            id,
            &OrderPatch {
                total_amount: Some(total_amount),
                ..OrderPatch::default()
            },
        )
        .await?;

    Ok(Json(ReconcileOrderResponse {
        order_id: id,
        created,
        updated,
        deleted,
        total_amount,
    }))
}

/// Updates and creates never touch the same line, so they run as one
/// concurrent wave; deletes follow once the wave has settled.
async fn dispatch_reconciliation(
    state: &AppState,
    order_id: i64,
    plan: ReconciliationPlan,
) -> Result<(), AppError> {
    let mut upserts: Vec<BoxFuture<'static, (String, Result<(), AppError>)>> = Vec::new();

    for item in plan.to_update {
        let OrderItemRef::Existing { id } = &item.item_ref else {
            continue;
        };
        let id = *id;
        let store = state.store.clone();
        upserts.push(
            async move {
                let patch = OrderItemPatch {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                };
                (format!("update item {}", id), store.update_order_item(id, &patch).await)
            }
            .boxed(),
        );
    }
    for item in plan.to_create {
        let store = state.store.clone();
        upserts.push(
            async move {
                let label = format!("create item for product {}", item.product_id);
                let body = NewOrderItem {
                    order_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                };
                (label, store.create_order_item(&body).await)
            }
            .boxed(),
        );
    }

    let upsert_succeeded = match collect_batch(join_all(upserts).await) {
        Ok(ops) => ops,
        Err(err) => {
            error!(%err, order_id, "Order item upsert batch failed");
            return Err(err);
        }
    };

    let deletes: Vec<BoxFuture<'static, (String, Result<(), AppError>)>> = plan
        .to_delete
        .into_iter()
        .map(|id| {
            let store = state.store.clone();
            async move { (format!("delete item {}", id), store.delete_order_item(id).await) }
                .boxed()
        })
        .collect();

    match collect_batch(join_all(deletes).await) {
        Ok(_) => Ok(()),
        Err(AppError::PartialBatch(mut report)) => {
            // The upsert wave already landed; keep it in the report.
            let mut succeeded = upsert_succeeded;
            succeeded.extend(report.succeeded);
            report.succeeded = succeeded;
            error!(order_id, "Order item delete batch failed");
            Err(AppError::PartialBatch(report))
        }
        Err(err) => Err(err),
    }
}
