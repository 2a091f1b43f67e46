// src/state.rs
use std::collections::HashSet;

use crate::client::store::StoreClient;

#[derive(Clone)]
pub struct AppState {
    pub store: StoreClient,
    /// Categories whose synthesized weeks open with the previous
    /// week's unsold stock.
    pub carry_forward_categories: HashSet<i64>,
}

impl AppState {
    pub fn new(store: StoreClient, carry_forward_categories: HashSet<i64>) -> Self {
        Self {
            store,
            carry_forward_categories,
        }
    }
}
