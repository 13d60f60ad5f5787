//! Migration units loaded from `.sql` files.
//!
//! A file named `<digits>_<name>.sql` declares the identifier `<digits>`.
//! Its contents are split into statements once, at discovery time.

use crate::error::{CoreError, CoreResult};
use crate::migration::{Migration, StatementBatch};
use crate::migration_id::MigrationId;
use crate::splitter::split_statements;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A migration unit backed by a SQL script.
#[derive(Debug, Clone)]
pub struct SqlFileMigration {
    id: MigrationId,
    name: String,
    path: PathBuf,
    statements: Arc<[String]>,
}

impl SqlFileMigration {
    /// Read and split the SQL file at `path`.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let (id, name) = parse_file_name(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let statements = split_statements(&content).map_err(|e| CoreError::SqlTokenize {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if statements.is_empty() {
            log::warn!("Migration file {} contains no statements", path.display());
        }
        Ok(Self {
            id,
            name,
            path: path.to_path_buf(),
            statements: statements.into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }
}

impl Migration for SqlFileMigration {
    fn id(&self) -> Option<i32> {
        Some(self.id.get())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn up(&self, batch: &mut StatementBatch) {
        batch.extend(self.statements.iter().cloned());
    }
}

/// Extract the declared identifier and unit name from a migration file name.
///
/// `0007_add_users.sql` yields `(7, "0007_add_users")`.
pub fn parse_file_name(path: &Path) -> CoreResult<(MigrationId, String)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::MissingIdentifier {
            name: path.display().to_string(),
        })?;

    let digits_len = stem
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(stem.len());
    if digits_len == 0 {
        return Err(CoreError::MissingIdentifier {
            name: path.display().to_string(),
        });
    }

    let digits = &stem[..digits_len];
    let id = MigrationId::parse(digits).ok_or_else(|| CoreError::InvalidIdentifier {
        name: path.display().to_string(),
        value: digits.to_string(),
    })?;

    Ok((id, stem.to_string()))
}

/// Recursively load every `.sql` file under `dir`, in sorted path order.
pub fn discover_sql_files(dir: &Path) -> CoreResult<Vec<SqlFileMigration>> {
    if !dir.is_dir() {
        return Err(CoreError::LocationNotFound {
            path: dir.display().to_string(),
        });
    }
    let mut units = Vec::new();
    discover_recursive(dir, &mut units)?;
    Ok(units)
}

fn discover_recursive(dir: &Path, units: &mut Vec<SqlFileMigration>) -> CoreResult<()> {
    let io_err = |e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    };

    let mut paths = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            discover_recursive(&path, units)?;
        } else if path.extension().is_some_and(|e| e == "sql") {
            units.push(SqlFileMigration::load(&path)?);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "sql_file_test.rs"]
mod tests;
