use axum::{routing::get, Router};
use crate::handlers::recap::{producer_recap, product_recap};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recaps/products/{week}", get(product_recap))
        .route("/recaps/producers/{week}", get(producer_recap))
}
