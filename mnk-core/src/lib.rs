//! m,n,k game logic.
//!
//! A `rows × columns` grid, two players alternating marks, first to get `k`
//! in a row (horizontally, vertically or diagonally) wins. Player One always
//! moves first.
//!
//! # Cell layout
//!
//! Cells are stored row-major. On a 3×5 board:
//!
//! ```text
//!   (0,0)=0   (0,1)=1   (0,2)=2   (0,3)=3   (0,4)=4
//!   (1,0)=5   (1,1)=6   (1,2)=7   (1,3)=8   (1,4)=9
//!   (2,0)=10  (2,1)=11  (2,2)=12  (2,3)=13  (2,4)=14
//! ```
//!
//! # Canonical keys
//!
//! Two positions related by a board symmetry (rotation or reflection that
//! maps the rectangle onto itself) have the same game value. A
//! [`CanonicalKey`] is the lexicographically smallest grid among all such
//! images, paired with the side to move; solvers key their tables on it.

mod board;
mod error;
mod movegen;
mod symmetry;
mod terminal;

use serde::{Deserialize, Serialize};

pub use board::Board;
pub use error::{Error, IllegalMoveReason};
pub use movegen::Successors;
pub use symmetry::{CanonicalKey, KeyMode, Symmetry};
pub use terminal::{Direction, Run};

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Convert from u8 (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }
}

/// Contents of a single cell.
///
/// The derived ordering (`Empty < One < Two`) is the ordering used to pick
/// the lexicographically smallest symmetric image of a grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty = 0,
    One = 1,
    Two = 2,
}

impl Cell {
    /// Owner of the mark in this cell, if any.
    #[inline]
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::One => Some(Player::One),
            Cell::Two => Some(Player::Two),
        }
    }

    /// Convert from the 2-bit encoding (0=empty, 1=P1, 2=P2).
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Cell> {
        match bits {
            0 => Some(Cell::Empty),
            1 => Some(Cell::One),
            2 => Some(Cell::Two),
            _ => None,
        }
    }

    /// Symbol used when rendering a board.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::One => 'O',
            Cell::Two => 'X',
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Cell {
        match player {
            Player::One => Cell::One,
            Player::Two => Cell::Two,
        }
    }
}

/// Game-theoretic value of a finished game or of a position under perfect play.
///
/// "Undecided" is represented as `Option<Outcome>::None`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win(Player),
    Draw,
}

impl Outcome {
    /// The winning player, if the outcome is not a draw.
    #[inline]
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Win(player) => Some(player),
            Outcome::Draw => None,
        }
    }

    /// Winner under the convention that a draw counts as a win for Player Two.
    ///
    /// The first player needs a forced win to "win"; anything less is
    /// credited to the second player. This is purely a reporting choice.
    #[inline]
    pub fn folded_winner(self) -> Player {
        match self {
            Outcome::Win(player) => player,
            Outcome::Draw => Player::Two,
        }
    }

    /// Stable signed encoding: Win(One)=1, Draw=0, Win(Two)=-1.
    #[inline]
    pub fn to_i8(self) -> i8 {
        match self {
            Outcome::Win(Player::One) => 1,
            Outcome::Draw => 0,
            Outcome::Win(Player::Two) => -1,
        }
    }

    /// Decode the signed encoding produced by [`Outcome::to_i8`].
    #[inline]
    pub fn from_i8(value: i8) -> Option<Outcome> {
        match value {
            1 => Some(Outcome::Win(Player::One)),
            0 => Some(Outcome::Draw),
            -1 => Some(Outcome::Win(Player::Two)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win(Player::One) => write!(f, "Player 1 wins"),
            Outcome::Win(Player::Two) => write!(f, "Player 2 wins"),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

/// A placement of `player`'s mark at (`row`, `column`).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub column: usize,
    pub player: Player,
}

impl Move {
    #[inline]
    pub fn new(row: usize, column: usize, player: Player) -> Move {
        Move { row, column, player }
    }
}
