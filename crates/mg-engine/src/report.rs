//! Run and status reports

use crate::executor::StatementFailure;
use chrono::{DateTime, Utc};
use mg_core::{DiscoveredMigrations, MigrationDescriptor, MigrationId};
use serde::Serialize;
use std::collections::HashSet;

/// A unit that was applied and recorded in this run.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMigration {
    pub id: MigrationId,
    pub name: String,
    pub statements: usize,
    pub duration_ms: u64,
}

/// Why a unit stopped the run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// A statement (or the commit) failed; nothing from the unit persisted
    RolledBack(StatementFailure),
    /// The unit's statements committed but its ledger row did not
    RecordFailed { message: String },
}

/// The unit a run halted on.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationFailure {
    pub id: MigrationId,
    pub name: String,
    pub reason: FailureReason,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every pending unit was applied and recorded
    Completed,
    /// Another process holds the run lock; nothing was applied
    LockDenied,
    /// A unit failed; later units were never attempted
    Failed(MigrationFailure),
}

/// Outcome of one migration run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    /// Number of units discovered
    pub discovered: usize,
    /// Units applied in this run, in application order
    pub applied: Vec<AppliedMigration>,
    /// Pending units skipped because an earlier unit failed
    pub not_attempted: Vec<MigrationId>,
    #[serde(flatten)]
    pub status: RunStatus,
}

impl RunReport {
    pub(crate) fn new(started_at: DateTime<Utc>, discovered: usize) -> Self {
        Self {
            started_at,
            elapsed_secs: 0.0,
            discovered,
            applied: Vec::new(),
            not_attempted: Vec::new(),
            status: RunStatus::Completed,
        }
    }

    /// `true` iff every pending unit, in ascending order, was applied and
    /// recorded.
    pub fn success(&self) -> bool {
        matches!(self.status, RunStatus::Completed)
    }

    pub fn applied_ids(&self) -> Vec<MigrationId> {
        self.applied.iter().map(|m| m.id).collect()
    }

    pub fn failure(&self) -> Option<&MigrationFailure> {
        match &self.status {
            RunStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Applied/pending state of one discovered unit.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub id: MigrationId,
    pub name: String,
    pub applied: bool,
}

/// Read-only view of discovery against the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Whether the ledger table exists yet
    pub ledger_exists: bool,
    /// Every discovered unit, ascending
    pub entries: Vec<StatusEntry>,
    /// Recorded identifiers with no discovered unit
    pub orphaned: Vec<MigrationId>,
}

impl StatusReport {
    pub(crate) fn build(
        discovered: &DiscoveredMigrations,
        committed: &HashSet<MigrationId>,
        ledger_exists: bool,
    ) -> Self {
        let entries = discovered
            .iter()
            .map(|unit: &MigrationDescriptor| StatusEntry {
                id: unit.id(),
                name: unit.name().to_string(),
                applied: committed.contains(&unit.id()),
            })
            .collect();

        let mut orphaned: Vec<MigrationId> = committed
            .iter()
            .copied()
            .filter(|id| !discovered.contains(*id))
            .collect();
        orphaned.sort();

        Self {
            ledger_exists,
            entries,
            orphaned,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.applied).count()
    }
}
