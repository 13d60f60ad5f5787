//! mg-db - Database connection layer for the migrator
//!
//! This crate provides the blocking `Database` trait the engine runs
//! against, and its Postgres implementation.

pub mod error;
pub mod postgres;
pub mod traits;

pub use error::{DbError, DbResult};
pub use self::postgres::{ConnectionSettings, PostgresBackend};
pub use traits::Database;
