//! In-memory stand-in for a Postgres server, for tests.
//!
//! Understands exactly the SQL the engine issues for its ledger and run lock,
//! plus `BEGIN`/`COMMIT`/`ROLLBACK`. Any other statement is treated as a
//! schema change: it is recorded and takes effect on commit. Sessions opened
//! from one [`MockServer`] share the ledger, the applied statements and the
//! advisory-lock table, like connections to one database.

use crate::ledger::{BOOTSTRAP_SQL, COMMITTED_SQL, EXISTS_SQL, INSERT_PREFIX};
use crate::lock::{TRY_LOCK_PREFIX, UNLOCK_PREFIX};
use mg_db::{Database, DbError, DbResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ServerState {
    ledger_table: bool,
    ledger: Vec<i32>,
    applied: Vec<String>,
    executed: Vec<String>,
    fail_patterns: Vec<String>,
    fail_validation: bool,
    locks: HashMap<i64, u64>,
    lock_requests: usize,
    next_session: u64,
    closed: HashSet<u64>,
}

/// Shared database state behind any number of [`MockDatabase`] sessions.
#[derive(Debug, Clone, Default)]
pub struct MockServer {
    state: Arc<Mutex<ServerState>>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().expect("mock server mutex poisoned")
    }

    /// Open a new session
    pub fn connect(&self) -> MockDatabase {
        let session = {
            let mut state = self.state();
            state.next_session += 1;
            state.next_session
        };
        MockDatabase {
            server: self.clone(),
            session,
            tx: None,
        }
    }

    /// Make every statement containing `pattern` fail
    pub fn fail_on(&self, pattern: impl Into<String>) -> &Self {
        self.state().fail_patterns.push(pattern.into());
        self
    }

    /// Drop every injected statement failure
    pub fn clear_failures(&self) -> &Self {
        self.state().fail_patterns.clear();
        self
    }

    /// Make connection validation fail
    pub fn fail_validation(&self) -> &Self {
        self.state().fail_validation = true;
        self
    }

    /// Create the ledger table with the given rows already recorded
    pub fn seed_ledger(&self, ids: &[i32]) -> &Self {
        let mut state = self.state();
        state.ledger_table = true;
        state.ledger.extend_from_slice(ids);
        self
    }

    pub fn ledger_exists(&self) -> bool {
        self.state().ledger_table
    }

    /// Recorded identifiers in insertion order
    pub fn ledger(&self) -> Vec<i32> {
        self.state().ledger.clone()
    }

    /// Committed schema-change statements in commit order
    pub fn applied(&self) -> Vec<String> {
        self.state().applied.clone()
    }

    /// Every non-transaction-control statement attempted, including failures
    pub fn executed(&self) -> Vec<String> {
        self.state().executed.clone()
    }

    /// Number of `pg_try_advisory_lock` calls made
    pub fn lock_requests(&self) -> usize {
        self.state().lock_requests
    }

    /// Session currently holding `key`
    pub fn lock_holder(&self, key: i64) -> Option<u64> {
        self.state().locks.get(&key).copied()
    }

    pub fn is_closed(&self, session: u64) -> bool {
        self.state().closed.contains(&session)
    }

    /// Whether every session opened so far has been closed
    pub fn all_closed(&self) -> bool {
        let state = self.state();
        (1..=state.next_session).all(|s| state.closed.contains(&s))
    }
}

#[derive(Debug, Default)]
struct PendingTx {
    statements: Vec<String>,
    ledger: Vec<i32>,
    aborted: bool,
}

/// One session against a [`MockServer`].
#[derive(Debug)]
pub struct MockDatabase {
    server: MockServer,
    session: u64,
    tx: Option<PendingTx>,
}

impl MockDatabase {
    pub fn session(&self) -> u64 {
        self.session
    }

    fn check_open(&self) -> DbResult<()> {
        if self.server.is_closed(self.session) {
            return Err(DbError::ConnectionError("connection closed".to_string()));
        }
        Ok(())
    }

    fn fail(&mut self, message: String) -> DbResult<()> {
        if let Some(tx) = self.tx.as_mut() {
            tx.aborted = true;
        }
        Err(DbError::ExecutionError(message))
    }

    fn run_statement(&mut self, sql: &str) -> DbResult<()> {
        let (injected, ledger_table, duplicate) = {
            let mut state = self.server.state();
            state.executed.push(sql.to_string());
            let injected = state.fail_patterns.iter().any(|p| sql.contains(p.as_str()));
            let id = parse_insert_id(sql);
            let duplicate = id.is_some_and(|id| {
                state.ledger.contains(&id)
                    || self.tx.as_ref().is_some_and(|tx| tx.ledger.contains(&id))
            });
            (injected, state.ledger_table, duplicate)
        };

        if self.tx.as_ref().is_some_and(|tx| tx.aborted) {
            return Err(DbError::ExecutionError(
                "25P02: current transaction is aborted, commands ignored until end of transaction block"
                    .to_string(),
            ));
        }
        if injected {
            return self.fail(format!("XX000: injected failure for: {sql}"));
        }

        if sql == BOOTSTRAP_SQL {
            self.server.state().ledger_table = true;
            return Ok(());
        }

        if let Some(id) = parse_insert_id(sql) {
            if !ledger_table {
                return self.fail("42P01: relation \"migrator\" does not exist".to_string());
            }
            if duplicate {
                return self.fail(format!(
                    "23505: duplicate key value violates unique constraint \"migration_id_index\" (migration_id)=({id})"
                ));
            }
            match self.tx.as_mut() {
                Some(tx) => tx.ledger.push(id),
                None => self.server.state().ledger.push(id),
            }
            return Ok(());
        }

        match self.tx.as_mut() {
            Some(tx) => tx.statements.push(sql.to_string()),
            None => self.server.state().applied.push(sql.to_string()),
        }
        Ok(())
    }
}

fn parse_insert_id(sql: &str) -> Option<i32> {
    sql.strip_prefix(INSERT_PREFIX)?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

fn parse_lock_key(sql: &str, prefix: &str) -> Option<i64> {
    sql.strip_prefix(prefix)?.strip_suffix(')')?.trim().parse().ok()
}

impl Database for MockDatabase {
    fn db_type(&self) -> &'static str {
        "mock"
    }

    fn validate(&mut self) -> DbResult<()> {
        self.check_open()?;
        if self.server.state().fail_validation {
            return Err(DbError::ConnectionError("server closed the connection".to_string()));
        }
        Ok(())
    }

    fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        self.check_open()?;
        match sql.trim().to_ascii_uppercase().as_str() {
            "BEGIN" => {
                if self.tx.is_none() {
                    self.tx = Some(PendingTx::default());
                }
                Ok(())
            }
            "COMMIT" => {
                if let Some(tx) = self.tx.take() {
                    if !tx.aborted {
                        let mut state = self.server.state();
                        state.applied.extend(tx.statements);
                        state.ledger.extend(tx.ledger);
                    }
                }
                Ok(())
            }
            "ROLLBACK" => {
                self.tx = None;
                Ok(())
            }
            _ => self.run_statement(sql),
        }
    }

    fn query_i32_column(&mut self, sql: &str) -> DbResult<Vec<i32>> {
        self.check_open()?;
        let state = self.server.state();
        if state.fail_patterns.iter().any(|p| sql.contains(p.as_str())) {
            return Err(DbError::ExecutionError(format!("XX000: injected failure for: {sql}")));
        }
        if sql != COMMITTED_SQL {
            return Err(DbError::ExecutionError(format!("mock: unsupported query: {sql}")));
        }
        if !state.ledger_table {
            return Err(DbError::ExecutionError(
                "42P01: relation \"migrator\" does not exist".to_string(),
            ));
        }
        let mut ids = state.ledger.clone();
        ids.sort_unstable();
        Ok(ids)
    }

    fn query_bool(&mut self, sql: &str) -> DbResult<bool> {
        self.check_open()?;
        let mut state = self.server.state();
        if state.fail_patterns.iter().any(|p| sql.contains(p.as_str())) {
            return Err(DbError::ExecutionError(format!("XX000: injected failure for: {sql}")));
        }
        if sql == EXISTS_SQL {
            return Ok(state.ledger_table);
        }
        if let Some(key) = parse_lock_key(sql, TRY_LOCK_PREFIX) {
            state.lock_requests += 1;
            return Ok(match state.locks.get(&key) {
                Some(holder) => *holder == self.session,
                None => {
                    state.locks.insert(key, self.session);
                    true
                }
            });
        }
        if let Some(key) = parse_lock_key(sql, UNLOCK_PREFIX) {
            if state.locks.get(&key) == Some(&self.session) {
                state.locks.remove(&key);
                return Ok(true);
            }
            return Ok(false);
        }
        Err(DbError::ExecutionError(format!("mock: unsupported query: {sql}")))
    }

    fn close(self) -> DbResult<()> {
        let mut state = self.server.state();
        let session = self.session;
        state.locks.retain(|_, holder| *holder != session);
        state.closed.insert(session);
        Ok(())
    }
}
