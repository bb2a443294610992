//! Exact solver for m,n,k games.
//!
//! Two independent solvers compute the perfect-play outcome of a position:
//!
//! - [`Solver`]: memoized descent over the implicit game tree, stopping at
//!   the first winning move.
//! - [`GameGraph`]: the full reachable state graph, labeled bottom-up from
//!   its terminal leaves.
//!
//! [`cross_validate`] runs both over the same positions and reports every
//! state where they disagree.

pub mod agreement;
pub mod budget;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod graph;
pub mod solver;
pub mod stats;

pub use agreement::{cross_validate, Agreement, Mismatch};
pub use budget::Budget;
pub use checkpoint::{Checkpoint, Shape};
pub use config::{CheckpointConfig, SolverConfig};
pub use error::{Resource, SolveError};
pub use graph::{solve_graph, GameGraph, GraphStats};
pub use solver::Solver;
pub use stats::SolverStats;
