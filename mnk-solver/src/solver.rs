//! Memoized backward induction over the implicit game tree.
//!
//! A position is a win for the side to move if any child is; otherwise it is
//! a draw if any child is drawn, and a loss if every child is lost. Exploring
//! stops at the first winning child. The recursion runs on an explicit frame
//! stack, so depth is bounded by memory rather than the thread's call stack.

use std::collections::HashMap;
use std::time::Instant;

use mnk_core::{Board, CanonicalKey, Move, Outcome, Player};
use tracing::{debug, info, warn};

use crate::checkpoint::{Checkpoint, Shape};
use crate::config::SolverConfig;
use crate::error::SolveError;
use crate::stats::SolverStats;

/// Stack frame for iterative descent.
struct Frame {
    /// Table key of this position
    key: CanonicalKey,
    board: Board,
    /// Legal moves in row-major order
    moves: Vec<Move>,
    /// Index into moves
    move_idx: usize,
    /// Side to move at this position
    mover: Player,
    /// Some child is a win for the mover
    won: bool,
    /// Some child is a draw
    saw_draw: bool,
}

impl Frame {
    fn new(board: Board, key: CanonicalKey) -> Frame {
        Frame {
            key,
            moves: board.legal_moves(),
            move_idx: 0,
            mover: board.to_move(),
            won: false,
            saw_draw: false,
            board,
        }
    }

    /// Get the next move, or None once exhausted or won.
    #[inline]
    fn next_move(&mut self) -> Option<Move> {
        if self.won || self.move_idx >= self.moves.len() {
            return None;
        }
        let mov = self.moves[self.move_idx];
        self.move_idx += 1;
        Some(mov)
    }

    /// Fold a child's outcome into this frame.
    #[inline]
    fn absorb(&mut self, child: Outcome) {
        match child {
            Outcome::Win(player) if player == self.mover => self.won = true,
            Outcome::Draw => self.saw_draw = true,
            Outcome::Win(_) => {}
        }
    }

    /// Moves never explored because a winning move was found first.
    #[inline]
    fn skipped(&self) -> usize {
        self.moves.len() - self.move_idx
    }

    fn outcome(&self) -> Outcome {
        if self.won {
            Outcome::Win(self.mover)
        } else if self.saw_draw {
            Outcome::Draw
        } else {
            Outcome::Win(self.mover.opponent())
        }
    }
}

/// Descent solver with transposition table.
pub struct Solver {
    shape: Shape,
    config: SolverConfig,
    /// Transposition table: table key -> perfect-play outcome
    pub table: HashMap<CanonicalKey, Outcome>,
    /// Solver statistics
    pub stats: SolverStats,
}

impl Solver {
    /// Create a solver for `rows × columns` boards with `k` to win.
    pub fn new(rows: usize, columns: usize, k: usize, config: SolverConfig) -> Self {
        Self {
            shape: Shape { rows, columns, k },
            config,
            table: HashMap::new(),
            stats: SolverStats::new(),
        }
    }

    /// Create a solver for positions of the same game as `board`.
    pub fn for_board(board: &Board, config: SolverConfig) -> Self {
        Self::new(board.rows(), board.columns(), board.k(), config)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn check_shape(&self, board: &Board) -> Result<(), SolveError> {
        let Shape { rows, columns, k } = self.shape;
        if board.rows() != rows || board.columns() != columns || board.k() != k {
            return Err(SolveError::ShapeMismatch {
                rows,
                columns,
                k,
                got_rows: board.rows(),
                got_columns: board.columns(),
                got_k: board.k(),
            });
        }
        Ok(())
    }

    /// Cached outcome of `board`, if already solved.
    pub fn outcome(&self, board: &Board) -> Option<Outcome> {
        self.table.get(&board.key(self.config.key_mode)).copied()
    }

    /// Solve `board` under perfect play.
    ///
    /// Fails with `ResourceExhausted` or `Interrupted` when the configured
    /// budget runs out; the table then holds only fully resolved positions.
    pub fn solve(&mut self, board: &Board) -> Result<Outcome, SolveError> {
        self.check_shape(board)?;
        let key_mode = self.config.key_mode;
        let root_key = board.key(key_mode);

        // Check if already solved
        if let Some(&outcome) = self.table.get(&root_key) {
            self.stats.cache_hits += 1;
            return Ok(outcome);
        }

        if let Some(outcome) = board.winner() {
            self.table.insert(root_key, outcome);
            self.stats.record_terminal(outcome);
            return Ok(outcome);
        }

        let budget = self.config.budget.clone();
        let mut clock = budget.start();

        // Timing for checkpoints and logging
        let mut last_checkpoint = Instant::now();
        let mut last_log = Instant::now();

        let mut stack: Vec<Frame> = Vec::with_capacity(board.moves_remaining() + 1);
        stack.push(Frame::new(board.clone(), root_key));

        loop {
            clock.check(self.table.len())?;

            if let Some(checkpoint) = &self.config.checkpoint {
                if last_checkpoint.elapsed() >= checkpoint.interval {
                    self.save_checkpoint(&checkpoint.path).ok();
                    last_checkpoint = Instant::now();
                }
            }

            if last_log.elapsed() >= self.config.log_interval {
                self.stats.log_progress(self.table.len());
                last_log = Instant::now();
            }

            let Some(frame) = stack.last_mut() else {
                break;
            };

            if let Some(mov) = frame.next_move() {
                let child = frame.board.successor(mov)?;
                let child_key = child.key(key_mode);

                // Cache hit
                if let Some(&outcome) = self.table.get(&child_key) {
                    self.stats.cache_hits += 1;
                    frame.absorb(outcome);
                    continue;
                }

                // Terminal check - someone won or the board is full
                if let Some(outcome) = child.winner() {
                    self.table.insert(child_key, outcome);
                    self.stats.record_terminal(outcome);
                    frame.absorb(outcome);
                    continue;
                }

                stack.push(Frame::new(child, child_key));
                self.stats.max_depth = self.stats.max_depth.max(stack.len() as u64);
            } else {
                // No more moves (or a winning move found) - pop and record
                let Some(frame) = stack.pop() else {
                    break;
                };
                self.stats.branches_pruned += frame.skipped() as u64;

                let outcome = frame.outcome();
                self.table.insert(frame.key, outcome);
                self.stats.positions_evaluated += 1;

                match stack.last_mut() {
                    Some(parent) => parent.absorb(outcome),
                    None => {
                        debug!(
                            positions = self.stats.positions_evaluated,
                            unique = self.table.len(),
                            elapsed_ms = clock.elapsed().as_millis() as u64,
                            "solve finished"
                        );
                        return Ok(outcome);
                    }
                }
            }
        }

        // The root frame always returns from inside the loop.
        Err(SolveError::Incomplete { unlabeled: 1 })
    }

    /// Outcome of every legal move from `board`, in row-major order.
    pub fn move_values(&mut self, board: &Board) -> Result<Vec<(Move, Outcome)>, SolveError> {
        self.check_shape(board)?;
        let mut values = Vec::new();
        for (mov, child) in board.successors() {
            values.push((mov, self.solve(&child)?));
        }
        Ok(values)
    }

    /// Moves that achieve the perfect-play outcome of `board`.
    pub fn best_moves(&mut self, board: &Board) -> Result<Vec<Move>, SolveError> {
        let target = self.solve(board)?;
        Ok(self
            .move_values(board)?
            .into_iter()
            .filter(|&(_, outcome)| outcome == target)
            .map(|(mov, _)| mov)
            .collect())
    }

    /// Merge a checkpoint into the table. Returns the number of entries read.
    pub fn load_checkpoint(&mut self, path: &std::path::Path) -> Result<usize, SolveError> {
        let start = Instant::now();
        let checkpoint = Checkpoint::load(path).map_err(|source| SolveError::Checkpoint {
            operation: "load",
            source,
        })?;

        self.check_checkpoint_shape(checkpoint.shape)?;

        let count = checkpoint.entries.len();
        self.table.extend(checkpoint.entries);
        info!(
            positions = count,
            secs = %format!("{:.2}", start.elapsed().as_secs_f64()),
            "loaded checkpoint"
        );
        Ok(count)
    }

    fn check_checkpoint_shape(&self, shape: Shape) -> Result<(), SolveError> {
        if shape == self.shape {
            return Ok(());
        }
        let Shape { rows, columns, k } = self.shape;
        Err(SolveError::ShapeMismatch {
            rows,
            columns,
            k,
            got_rows: shape.rows,
            got_columns: shape.columns,
            got_k: shape.k,
        })
    }

    /// Write the table to `path`. Returns the number of entries written.
    ///
    /// An existing checkpoint for another board shape is never overwritten.
    pub fn save_checkpoint(&self, path: &std::path::Path) -> Result<usize, SolveError> {
        if let Ok(existing) = Checkpoint::read_shape(path) {
            if let Err(e) = self.check_checkpoint_shape(existing) {
                warn!(path = ?path, error = %e, "refusing to overwrite checkpoint");
                return Err(e);
            }
        }

        let start = Instant::now();
        match Checkpoint::save(path, self.shape, &self.table) {
            Ok(count) => {
                info!(
                    positions = count,
                    secs = %format!("{:.2}", start.elapsed().as_secs_f64()),
                    "saved checkpoint"
                );
                Ok(count)
            }
            Err(source) => {
                warn!(error = %source, "checkpoint save failed");
                Err(SolveError::Checkpoint {
                    operation: "save",
                    source,
                })
            }
        }
    }
}
