//! Run mode

use serde::{Deserialize, Serialize};

/// Logging verbosity of a run.
///
/// Only toggles whether executed statements and per-unit outcomes are
/// logged. Control flow and persisted state are identical in both modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Only failures are logged
    Silent,
    /// Statements, outcomes and progress are logged
    #[default]
    Default,
}

impl RunMode {
    pub fn is_silent(self) -> bool {
        self == RunMode::Silent
    }
}
