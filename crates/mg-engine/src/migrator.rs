//! Run orchestration.
//!
//! A run moves through `discover -> validate connection -> bootstrap ledger
//! -> acquire lock -> apply pending units -> release lock -> close`. The lock
//! is released and the connection closed on every path once they were
//! obtained, however the run ends.

use crate::error::{EngineError, EngineResult};
use crate::executor::{self, ApplyOutcome};
use crate::ledger;
use crate::lock::{RunLock, DEFAULT_LOCK_KEY};
use crate::report::{
    AppliedMigration, FailureReason, MigrationFailure, RunReport, RunStatus, StatusReport,
};
use chrono::Utc;
use mg_core::{DiscoveredMigrations, MigrationDescriptor, Registry, RunMode, StatementBatch};
use mg_db::{ConnectionSettings, Database, PostgresBackend};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything one run needs besides the connection.
#[derive(Debug)]
pub struct Migrator {
    registry: Registry,
    location: Option<PathBuf>,
    mode: RunMode,
    lock_key: i64,
}

impl Migrator {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            location: None,
            mode: RunMode::default(),
            lock_key: DEFAULT_LOCK_KEY,
        }
    }

    /// Also discover `.sql` units under `location`
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_lock_key(mut self, key: i64) -> Self {
        self.lock_key = key;
        self
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Discover and validate every unit. Touches no database.
    pub fn discover(&self) -> EngineResult<DiscoveredMigrations> {
        Ok(self.registry.discover(self.location())?)
    }

    /// Run against an open connection, which is closed before returning.
    pub fn run<D: Database>(&self, db: D) -> EngineResult<RunReport> {
        let discovered = match self.discover() {
            Ok(discovered) => discovered,
            Err(e) => {
                close_connection(db);
                return Err(e);
            }
        };
        self.run_discovered(db, &discovered)
    }

    /// Discover first, then connect to Postgres and run.
    pub fn run_postgres(&self, settings: &ConnectionSettings) -> EngineResult<RunReport> {
        let discovered = self.discover()?;
        self.note(format_args!("Connecting to {}", settings.display_target()));
        let db = PostgresBackend::connect(settings).map_err(EngineError::Connection)?;
        self.run_discovered(db, &discovered)
    }

    /// Run an already-discovered set against `db`, closing it afterwards.
    pub fn run_discovered<D: Database>(
        &self,
        mut db: D,
        discovered: &DiscoveredMigrations,
    ) -> EngineResult<RunReport> {
        let timer = Instant::now();
        let result = self.run_session(&mut db, discovered);
        close_connection(db);

        result.map(|mut report| {
            report.elapsed_secs = timer.elapsed().as_secs_f64();
            report
        })
    }

    /// Report applied/pending units without bootstrapping or locking.
    pub fn status<D: Database>(&self, mut db: D) -> EngineResult<StatusReport> {
        let result = self.status_session(&mut db);
        close_connection(db);
        result
    }

    fn status_session<D: Database>(&self, db: &mut D) -> EngineResult<StatusReport> {
        let discovered = self.discover()?;
        db.validate().map_err(EngineError::Connection)?;
        let ledger_exists = ledger::exists(db)?;
        let committed = if ledger_exists {
            ledger::committed(db)?
        } else {
            HashSet::new()
        };
        Ok(StatusReport::build(&discovered, &committed, ledger_exists))
    }

    fn run_session<D: Database>(
        &self,
        db: &mut D,
        discovered: &DiscoveredMigrations,
    ) -> EngineResult<RunReport> {
        let mut report = RunReport::new(Utc::now(), discovered.len());

        db.validate().map_err(EngineError::Connection)?;
        self.note(format_args!("Connection is established ({})", db.db_type()));

        ledger::bootstrap(db)?;

        let mut lock = RunLock::new(self.lock_key);
        if !lock.acquire(db)? {
            log::error!(
                "Another process is working with migration (advisory lock {}).",
                self.lock_key
            );
            report.status = RunStatus::LockDenied;
            return Ok(report);
        }
        self.note(format_args!("DB lock is caught"));

        let applied = self.apply_pending(db, discovered, &mut report);

        if let Err(e) = lock.release(db) {
            log::warn!("Failed to release run lock: {e}");
        }

        applied.map(|()| report)
    }

    fn apply_pending<D: Database>(
        &self,
        db: &mut D,
        discovered: &DiscoveredMigrations,
        report: &mut RunReport,
    ) -> EngineResult<()> {
        let committed = ledger::committed(db)?;
        let pending = discovered.pending(&committed);

        if pending.is_empty() {
            self.note(format_args!("Nothing to migrate"));
            return Ok(());
        }
        self.note(format_args!("{} pending migration(s)", pending.len()));

        for (position, unit) in pending.iter().enumerate() {
            if let Err(reason) = self.apply_one(db, unit, report) {
                log::error!("Migration #{} {} failed; halting", unit.id(), unit.name());
                report.not_attempted = pending[position + 1..].iter().map(|u| u.id()).collect();
                report.status = RunStatus::Failed(MigrationFailure {
                    id: unit.id(),
                    name: unit.name().to_string(),
                    reason,
                });
                break;
            }
        }
        Ok(())
    }

    fn apply_one<D: Database>(
        &self,
        db: &mut D,
        unit: &MigrationDescriptor,
        report: &mut RunReport,
    ) -> Result<(), FailureReason> {
        let migration = unit.instantiate();
        self.note(format_args!("RUN #{} {}", unit.id(), unit.name()));

        let started = Instant::now();
        let mut batch = StatementBatch::new();
        migration.up(&mut batch);

        let statements = match executor::apply(db, &batch, self.mode) {
            ApplyOutcome::Committed { statements } => statements,
            ApplyOutcome::RolledBack(failure) => return Err(FailureReason::RolledBack(failure)),
        };

        if let Err(e) = ledger::record(db, unit.id()) {
            log::error!(
                "Migration #{} was applied but could not be recorded: {e}",
                unit.id()
            );
            return Err(FailureReason::RecordFailed {
                message: e.to_string(),
            });
        }

        report.applied.push(AppliedMigration {
            id: unit.id(),
            name: unit.name().to_string(),
            statements,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        });
        Ok(())
    }

    /// Progress line, suppressed in silent mode
    fn note(&self, message: fmt::Arguments<'_>) {
        if !self.mode.is_silent() {
            log::info!("{message}");
        }
    }
}

fn close_connection<D: Database>(db: D) {
    if let Err(e) = db.close() {
        log::warn!("Failed to close connection: {e}");
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
