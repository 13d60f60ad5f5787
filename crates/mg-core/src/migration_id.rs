//! Strongly-typed migration identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author-declared identifier of a migration unit.
///
/// Stored in the ledger's `migration_id integer` column, so the range is
/// `0..=i32::MAX`. Ordering of identifiers is the only ordering the engine
/// guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationId(i32);

impl MigrationId {
    /// Create a new `MigrationId`, returning `None` for negative values.
    pub fn new(value: i32) -> Option<Self> {
        if value < 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Parse a decimal identifier, returning `None` if it is not a
    /// non-negative `i32`.
    pub fn parse(digits: &str) -> Option<Self> {
        digits.parse::<i32>().ok().and_then(Self::new)
    }

    /// Return the raw value as stored in the ledger.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for MigrationId {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(value)
    }
}

impl From<MigrationId> for i32 {
    fn from(id: MigrationId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[path = "migration_id_test.rs"]
mod tests;
