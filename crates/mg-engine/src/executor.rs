//! Statement executor.
//!
//! Applies one [`StatementBatch`] as a single transaction. Failures are
//! contained: the batch is rolled back, the error is logged, and the caller
//! gets a failed [`ApplyOutcome`] rather than an error.

use mg_core::{RunMode, StatementBatch};
use mg_db::Database;
use serde::Serialize;

/// Why a batch was rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementFailure {
    /// Zero-based position of the failing statement; `None` when `BEGIN`
    /// or `COMMIT` itself failed
    pub index: Option<usize>,
    /// The failing statement
    pub statement: Option<String>,
    /// Database error message
    pub message: String,
}

/// Outcome of applying one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Every statement ran and the transaction committed
    Committed { statements: usize },
    /// Nothing from the batch persisted
    RolledBack(StatementFailure),
}

impl ApplyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ApplyOutcome::Committed { .. })
    }
}

/// Run every statement of `batch` in order inside one transaction.
pub fn apply<D>(db: &mut D, batch: &StatementBatch, mode: RunMode) -> ApplyOutcome
where
    D: Database + ?Sized,
{
    if let Err(e) = db.begin() {
        return roll_back(
            db,
            StatementFailure {
                index: None,
                statement: None,
                message: format!("BEGIN failed: {e}"),
            },
        );
    }

    for (index, statement) in batch.iter().enumerate() {
        if !mode.is_silent() {
            log::info!("EXECUTE QUERY: {statement}");
        }
        if let Err(e) = db.execute_batch(statement) {
            return roll_back(
                db,
                StatementFailure {
                    index: Some(index),
                    statement: Some(statement.to_string()),
                    message: e.to_string(),
                },
            );
        }
    }

    if let Err(e) = db.commit() {
        return roll_back(
            db,
            StatementFailure {
                index: None,
                statement: None,
                message: format!("COMMIT failed: {e}"),
            },
        );
    }

    if !mode.is_silent() {
        log::info!("SUCCESS");
    }
    ApplyOutcome::Committed {
        statements: batch.len(),
    }
}

fn roll_back<D>(db: &mut D, failure: StatementFailure) -> ApplyOutcome
where
    D: Database + ?Sized,
{
    log::error!("FAILED");
    log::error!("{}", failure.message);
    if let Err(e) = db.rollback() {
        log::warn!("ROLLBACK failed: {e}");
    }
    log::error!("ROLLBACK MIGRATION");
    ApplyOutcome::RolledBack(failure)
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
