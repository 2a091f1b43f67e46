pub mod ledger;
pub mod orders;
pub mod recap;

use crate::error::{AppError, BatchFailure, BatchReport};

/// Folds fan-out outcomes into one result: all-success passes the op
/// labels through, any failure becomes a single aggregate. The calls
/// that went through have already taken effect on the store.
pub(crate) fn collect_batch(
    outcomes: Vec<(String, Result<(), AppError>)>,
) -> Result<Vec<String>, AppError> {
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for (op, result) in outcomes {
        match result {
            Ok(()) => succeeded.push(op),
            Err(err) => failed.push(BatchFailure {
                op,
                error: err.to_string(),
            }),
        }
    }

    if failed.is_empty() {
        Ok(succeeded)
    } else {
        Err(AppError::PartialBatch(BatchReport { succeeded, failed }))
    }
}
