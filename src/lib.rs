//! Weekly stock ledger and order reconciliation service for a
//! fresh-produce operation.
//!
//! The remote store API owns persistence and plain CRUD; this crate
//! adds the logic with real invariants on top of it:
//!
//! - **ISO week arithmetic** (`services::week`): Monday-based weeks,
//!   "YYYY-Wnn" labels, canonical UTC-midnight week starts.
//! - **Inventory ledger** (`services::ledger`): one history entry per
//!   active product and week, carry-forward opening stock, and the
//!   save plan for what the user actually touched.
//! - **Order reconciliation** (`services::reconcile`): turns an edited
//!   order into disjoint create/update/delete sets plus the recomputed
//!   total.
//! - **Recaps** (`services::recap`): per-week quantity roll-ups by
//!   product or by producer.
//!
//! `routes` + `handlers` expose these over HTTP; `client` talks to the
//! store API.

pub mod client;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
