//! Error types for mg-core

use thiserror::Error;

/// Errors raised while loading configuration or discovering migrations.
///
/// Every variant is fatal and is raised before the database is touched.
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Migration unit without a declared identifier
    #[error("[C001] Migration identifier not found for '{name}'")]
    MissingIdentifier { name: String },

    /// C002: Two migration units share one identifier
    #[error("[C002] Found two migrations with same id: {id}. M1: '{first}', M2: '{second}'")]
    DuplicateIdentifier {
        id: i32,
        first: String,
        second: String,
    },

    /// C003: Identifier outside the storable range
    #[error("[C003] Invalid migration identifier '{value}' in '{name}': must be between 0 and {max}", max = i32::MAX)]
    InvalidIdentifier { name: String, value: String },

    /// C004: Discovery location does not exist
    #[error("[C004] Migration location not found: {path}")]
    LocationNotFound { path: String },

    /// C005: SQL file could not be tokenized into statements
    #[error("[C005] Failed to split SQL in '{path}': {message}")]
    SqlTokenize { path: String, message: String },

    /// C006: Configuration file not found
    #[error("[C006] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C007: Configuration failed validation
    #[error("[C007] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C008: Unknown datasource requested
    #[error("[C008] Datasource '{name}' not found in config. Available: {available}")]
    DatasourceNotFound { name: String, available: String },

    /// C009: IO error with file path context
    #[error("[C009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C010: YAML parse error
    #[error("[C010] Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
