//! Error types for mg-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Malformed connection string (D003)
    #[error("[D003] Invalid connection string '{connection}': {message}")]
    InvalidConnectionString { connection: String, message: String },

    /// Query returned something other than what the caller expected (D004)
    #[error("[D004] Unexpected query result for '{sql}': {message}")]
    UnexpectedResult { sql: String, message: String },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<postgres::Error> for DbError {
    fn from(err: postgres::Error) -> Self {
        // Closed connections surface as connection errors so callers can tell
        // a dead session apart from a failing statement.
        if err.is_closed() {
            return DbError::ConnectionError(err.to_string());
        }
        match err.as_db_error() {
            Some(db) => DbError::ExecutionError(format!("{}: {}", db.code().code(), db.message())),
            None => DbError::ExecutionError(err.to_string()),
        }
    }
}
