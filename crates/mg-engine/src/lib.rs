//! mg-engine - Migration engine
//!
//! This crate drives a run: it bootstraps the ledger, takes the advisory run
//! lock, applies pending units one transaction at a time in ascending
//! identifier order, records each success, and always releases the lock and
//! closes the connection.

pub mod error;
pub mod executor;
pub mod ledger;
pub mod lock;
pub mod migrator;
pub mod report;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use error::{EngineError, EngineResult};
pub use executor::{apply, ApplyOutcome, StatementFailure};
pub use ledger::{LedgerStatus, LEDGER_TABLE};
pub use lock::{RunLock, DEFAULT_LOCK_KEY};
pub use migrator::Migrator;
pub use report::{
    AppliedMigration, FailureReason, MigrationFailure, RunReport, RunStatus, StatusEntry,
    StatusReport,
};
