use axum::{routing::post, Router};
use crate::handlers::orders::reconcile_order;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/orders/{id}/reconcile", post(reconcile_order))
}
