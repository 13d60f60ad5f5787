//! Cross-process run lock on a Postgres session-level advisory lock.

use crate::error::{EngineError, EngineResult};
use mg_db::Database;

pub use mg_core::DEFAULT_LOCK_KEY;

pub(crate) const TRY_LOCK_PREFIX: &str = "SELECT pg_try_advisory_lock(";
pub(crate) const UNLOCK_PREFIX: &str = "SELECT pg_advisory_unlock(";

/// Non-blocking exclusive lock keyed by a fixed number.
///
/// `held` mirrors whether this process holds the lock; exclusion itself is
/// enforced by the database. Every key shared by two targets serialises
/// both of them.
#[derive(Debug)]
pub struct RunLock {
    key: i64,
    held: bool,
}

impl RunLock {
    pub fn new(key: i64) -> Self {
        Self { key, held: false }
    }

    pub fn key(&self) -> i64 {
        self.key
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Try to take the lock without waiting.
    ///
    /// Returns `false` at once if another session holds it, `true` if it was
    /// taken now or is already held by this lock.
    pub fn acquire<D>(&mut self, db: &mut D) -> EngineResult<bool>
    where
        D: Database + ?Sized,
    {
        if self.held {
            return Ok(true);
        }
        let acquired = db
            .query_bool(&format!("{TRY_LOCK_PREFIX}{})", self.key))
            .map_err(EngineError::Lock)?;
        if acquired {
            self.held = true;
            log::debug!("Advisory lock {} acquired", self.key);
        }
        Ok(acquired)
    }

    /// Give the lock back. A no-op unless [`acquire`](Self::acquire)
    /// succeeded.
    pub fn release<D>(&mut self, db: &mut D) -> EngineResult<()>
    where
        D: Database + ?Sized,
    {
        if !self.held {
            return Ok(());
        }
        self.held = false;
        let released = db
            .query_bool(&format!("{UNLOCK_PREFIX}{})", self.key))
            .map_err(EngineError::Lock)?;
        if released {
            log::debug!("Advisory lock {} released", self.key);
        } else {
            log::warn!("Advisory lock {} was not held by this session", self.key);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod tests;
