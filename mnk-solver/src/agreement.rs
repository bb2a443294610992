//! Cross-checking the descent solver against the graph solver.

use mnk_core::{Board, KeyMode, Outcome};
use serde::Serialize;
use tracing::{info, warn};

use crate::budget::Budget;
use crate::config::SolverConfig;
use crate::error::SolveError;
use crate::graph::GameGraph;
use crate::solver::Solver;

/// A state the two solvers label differently.
#[derive(Debug, Clone, Serialize)]
pub struct Mismatch {
    /// Board rendered row by row
    pub board: String,
    pub marks_placed: usize,
    pub descent: Outcome,
    pub graph: Outcome,
}

/// Result of comparing both solvers over one reachable graph.
#[derive(Debug, Clone, Serialize)]
pub struct Agreement {
    /// States compared
    pub states: usize,
    /// Root outcome reported by the graph solver
    pub root: Outcome,
    pub mismatches: Vec<Mismatch>,
}

impl Agreement {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Solve every state reachable from `board` both ways and compare.
///
/// The budget applies to the graph build and to each descent.
pub fn cross_validate(
    board: &Board,
    key_mode: KeyMode,
    budget: &Budget,
) -> Result<Agreement, SolveError> {
    let mut graph = GameGraph::build(board, key_mode, budget)?;
    let root = graph.propagate()?;

    let mut solver = Solver::for_board(
        board,
        SolverConfig {
            key_mode,
            budget: budget.clone(),
            ..SolverConfig::default()
        },
    );

    let mut mismatches = Vec::new();
    for node in graph.nodes() {
        let Some(expected) = node.outcome() else {
            return Err(SolveError::Incomplete { unlabeled: 1 });
        };
        let got = solver.solve(node.board())?;
        if got != expected {
            warn!(
                marks = node.board().marks_placed(),
                descent = %got,
                graph = %expected,
                "solvers disagree"
            );
            mismatches.push(Mismatch {
                board: node.board().to_string(),
                marks_placed: node.board().marks_placed(),
                descent: got,
                graph: expected,
            });
        }
    }

    info!(
        states = graph.len(),
        mismatches = mismatches.len(),
        "cross-validation finished"
    );
    Ok(Agreement {
        states: graph.len(),
        root,
        mismatches,
    })
}
