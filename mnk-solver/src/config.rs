//! Solver configuration.

use std::path::PathBuf;
use std::time::Duration;

use mnk_core::KeyMode;

use crate::budget::Budget;

/// Periodic checkpointing of the transposition table.
#[derive(Debug, Clone)]
pub struct CheckpointConfig {
    pub path: PathBuf,
    pub interval: Duration,
}

impl CheckpointConfig {
    pub fn new(path: impl Into<PathBuf>) -> CheckpointConfig {
        CheckpointConfig {
            path: path.into(),
            interval: Duration::from_secs(60),
        }
    }
}

/// Settings for [`crate::Solver`].
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Whether symmetric positions share a table entry.
    pub key_mode: KeyMode,
    pub budget: Budget,
    /// How often progress is logged.
    pub log_interval: Duration,
    pub checkpoint: Option<CheckpointConfig>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            key_mode: KeyMode::Symmetric,
            budget: Budget::unlimited(),
            log_interval: Duration::from_secs(5),
            checkpoint: None,
        }
    }
}
