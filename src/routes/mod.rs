pub mod ledger;
pub mod orders;
pub mod recaps;

use axum::Router;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(ledger::routes())
        .merge(orders::routes())
        .merge(recaps::routes())
}
