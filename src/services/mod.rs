pub mod ledger;
pub mod recap;
pub mod reconcile;
pub mod week;
