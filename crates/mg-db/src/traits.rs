//! Database trait definition

use crate::error::DbResult;

/// Blocking database connection used by a single migration run.
///
/// A run owns its connection exclusively; nothing here is shared across
/// threads or runs. Every call returns synchronously.
pub trait Database {
    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Check that the connection is alive
    fn validate(&mut self) -> DbResult<()>;

    /// Execute one or more statements without parameters or results
    fn execute_batch(&mut self, sql: &str) -> DbResult<()>;

    /// Run a query and return its first column as `i32` values
    fn query_i32_column(&mut self, sql: &str) -> DbResult<Vec<i32>>;

    /// Run a query returning exactly one row with a boolean first column
    fn query_bool(&mut self, sql: &str) -> DbResult<bool>;

    /// Start an explicit transaction (auto-commit off until commit/rollback)
    fn begin(&mut self) -> DbResult<()> {
        self.execute_batch("BEGIN")
    }

    /// Commit the open transaction
    fn commit(&mut self) -> DbResult<()> {
        self.execute_batch("COMMIT")
    }

    /// Roll back the open transaction
    fn rollback(&mut self) -> DbResult<()> {
        self.execute_batch("ROLLBACK")
    }

    /// Close the connection, releasing every session-scoped resource
    fn close(self) -> DbResult<()>
    where
        Self: Sized;
}
