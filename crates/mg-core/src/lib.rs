//! mg-core - Core library for the migrator
//!
//! This crate provides the authoring API for migration units, the registry
//! that discovers and validates them, SQL-file units, and configuration
//! parsing. Nothing here touches a database.

pub mod config;
pub mod error;
pub mod migration;
pub mod migration_id;
pub mod mode;
pub mod registry;
pub mod splitter;
pub mod sql_file;

pub use config::{Config, DatasourceConfig, DEFAULT_LOCK_KEY};
pub use error::{CoreError, CoreResult};
pub use migration::{FnMigration, Migration, StatementBatch};
pub use migration_id::MigrationId;
pub use mode::RunMode;
pub use registry::{DiscoveredMigrations, MigrationDescriptor, MigrationFactory, Registry};
pub use splitter::split_statements;
pub use sql_file::SqlFileMigration;
