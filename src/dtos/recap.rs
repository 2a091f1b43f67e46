// src/dtos/recap.rs
use std::collections::BTreeMap;

use serde::Serialize;

use crate::services::recap::RecapLine;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecapResponse {
    pub week: String,
    pub lines: Vec<RecapLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerRecapResponse {
    pub week: String,
    pub producers: BTreeMap<String, Vec<RecapLine>>,
}
