//! Solver error types.

use std::fmt;
use std::io;

use thiserror::Error;

/// Which budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Number of stored states.
    States,
    /// Wall-clock milliseconds.
    Time,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::States => write!(f, "state"),
            Resource::Time => write!(f, "time (ms)"),
        }
    }
}

/// Errors raised while solving. None of them carries a partial result.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SolveError {
    #[error("{resource} budget exhausted: limit {limit}")]
    ResourceExhausted { resource: Resource, limit: u64 },

    #[error("solve interrupted")]
    Interrupted,

    #[error("board is {got_rows}x{got_columns} k={got_k}, expected {rows}x{columns} k={k}")]
    ShapeMismatch {
        rows: usize,
        columns: usize,
        k: usize,
        got_rows: usize,
        got_columns: usize,
        got_k: usize,
    },

    #[error("{unlabeled} states left unlabeled after propagation")]
    Incomplete { unlabeled: usize },

    #[error("board error: {0}")]
    Board(#[from] mnk_core::Error),

    #[error("failed to {operation} checkpoint: {source}")]
    Checkpoint {
        operation: &'static str,
        #[source]
        source: io::Error,
    },
}
