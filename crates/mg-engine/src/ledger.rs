//! Applied-migration ledger.
//!
//! One row per successfully applied unit in the `migrator` table. Rows are
//! only ever inserted. Recording runs in its own transaction, committed
//! separately from the unit's statements: a crash between the two commits
//! leaves a unit applied but unrecorded.

use crate::error::{EngineError, EngineResult};
use mg_core::MigrationId;
use mg_db::{Database, DbResult};
use std::collections::HashSet;

/// Ledger table name
pub const LEDGER_TABLE: &str = "migrator";

pub(crate) const BOOTSTRAP_SQL: &str = "CREATE TABLE IF NOT EXISTS migrator (
    migration_id integer NOT NULL,
    status       integer NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS migration_id_index ON migrator (migration_id);";

pub(crate) const COMMITTED_SQL: &str = "SELECT migration_id FROM migrator ORDER BY migration_id";

pub(crate) const EXISTS_SQL: &str = "SELECT to_regclass('migrator') IS NOT NULL";

pub(crate) const INSERT_PREFIX: &str = "INSERT INTO migrator (migration_id, status) VALUES (";

/// Value of the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerStatus {
    Applied,
}

impl LedgerStatus {
    pub fn code(self) -> i32 {
        match self {
            LedgerStatus::Applied => 1,
        }
    }
}

/// Create the ledger table and its unique index if missing. Idempotent.
pub fn bootstrap<D>(db: &mut D) -> EngineResult<()>
where
    D: Database + ?Sized,
{
    db.execute_batch(BOOTSTRAP_SQL)
        .map_err(EngineError::Bootstrap)
}

/// Whether the ledger table exists. Never creates it.
pub fn exists<D>(db: &mut D) -> EngineResult<bool>
where
    D: Database + ?Sized,
{
    db.query_bool(EXISTS_SQL).map_err(EngineError::Ledger)
}

/// Every recorded identifier.
pub fn committed<D>(db: &mut D) -> EngineResult<HashSet<MigrationId>>
where
    D: Database + ?Sized,
{
    let raw = db
        .query_i32_column(COMMITTED_SQL)
        .map_err(EngineError::Ledger)?;

    let mut ids = HashSet::with_capacity(raw.len());
    for value in raw {
        match MigrationId::new(value) {
            Some(id) => {
                ids.insert(id);
            }
            None => log::warn!("Ignoring invalid ledger entry: migration_id = {value}"),
        }
    }
    Ok(ids)
}

/// Insert one `applied` row for `id` and commit it immediately.
pub fn record<D>(db: &mut D, id: MigrationId) -> EngineResult<()>
where
    D: Database + ?Sized,
{
    let sql = insert_sql(id, LedgerStatus::Applied);
    if let Err(e) = insert_committed(db, &sql) {
        if let Err(rollback_err) = db.rollback() {
            log::warn!("ROLLBACK of ledger record failed: {rollback_err}");
        }
        return Err(EngineError::Ledger(e));
    }
    Ok(())
}

fn insert_committed<D>(db: &mut D, sql: &str) -> DbResult<()>
where
    D: Database + ?Sized,
{
    db.begin()?;
    db.execute_batch(sql)?;
    db.commit()
}

pub(crate) fn insert_sql(id: MigrationId, status: LedgerStatus) -> String {
    format!("{INSERT_PREFIX}{}, {})", id.get(), status.code())
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
