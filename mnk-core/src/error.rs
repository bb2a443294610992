//! Error types for board construction and move application.

use thiserror::Error;

/// Errors surfaced by [`crate::Board`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid board {rows}x{columns} with k={k}: need 1 <= k <= max(rows, columns)")]
    InvalidDimension { rows: usize, columns: usize, k: usize },

    #[error("invalid position: {reason}")]
    InvalidPosition { reason: String },

    #[error("illegal move at ({row}, {column}): {reason}")]
    IllegalMove {
        row: usize,
        column: usize,
        reason: IllegalMoveReason,
    },
}

/// Why a move was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMoveReason {
    #[error("cell is outside the board")]
    OutOfBounds,

    #[error("cell is already occupied")]
    Occupied,

    #[error("game is already over")]
    GameOver,

    #[error("it is not this player's turn")]
    WrongPlayer,
}
