use axum::{
    routing::{get, post},
    Router,
};
use crate::handlers::ledger::{get_ledger, save_ledger};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/{week}", get(get_ledger))
        .route("/ledger/{week}/save", post(save_ledger))
}
