//! Error types for the migration engine.

use mg_core::CoreError;
use mg_db::DbError;
use thiserror::Error;

/// Fatal run errors.
///
/// Lock denial and failing statements are not errors: they end the run
/// with a failed [`RunReport`](crate::report::RunReport) instead.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Missing or duplicate identifier, unreadable migration files (M001).
    #[error("[M001] Migration discovery failed: {0}")]
    Configuration(#[from] CoreError),

    /// Connection could not be opened or validated (M002).
    #[error("[M002] Database connection failed: {0}")]
    Connection(#[source] DbError),

    /// Ledger table or index could not be created (M003).
    #[error("[M003] Ledger bootstrap failed: {0}")]
    Bootstrap(#[source] DbError),

    /// Ledger could not be read (M004).
    #[error("[M004] Ledger query failed: {0}")]
    Ledger(#[source] DbError),

    /// Advisory lock query failed (M005).
    #[error("[M005] Run lock query failed: {0}")]
    Lock(#[source] DbError),
}

/// Result type alias for [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
