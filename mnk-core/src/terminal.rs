//! Terminal-state detection: k in a row or a full board.

use crate::{Board, Cell, Outcome, Player};

/// Scan direction for runs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    /// Left to right along a row.
    Horizontal,
    /// Top to bottom along a column.
    Vertical,
    /// Down and to the right.
    DiagonalDown,
    /// Up and to the right.
    DiagonalUp,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::DiagonalDown,
        Direction::DiagonalUp,
    ];

    /// (row, column) step.
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::DiagonalDown => (1, 1),
            Direction::DiagonalUp => (-1, 1),
        }
    }
}

/// A winning run of `k` marks starting at (`row`, `column`).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Run {
    pub player: Player,
    pub row: usize,
    pub column: usize,
    pub direction: Direction,
}

impl Board {
    /// Classify the position.
    ///
    /// Returns the winner if some player has `k` in a row, `Draw` if the
    /// board is full without one, and None while the game is still open.
    /// Cost is O(rows · columns · k).
    pub fn evaluate(&self) -> Option<Outcome> {
        if let Some(run) = self.winning_run() {
            return Some(Outcome::Win(run.player));
        }
        if self.moves_remaining() == 0 {
            return Some(Outcome::Draw);
        }
        None
    }

    /// First winning run found, scanning direction by direction and then
    /// cell by cell in row-major order.
    pub fn winning_run(&self) -> Option<Run> {
        self.find_run(|_| true)
    }

    /// Check if the given player has `k` in a row.
    pub fn has_run(&self, player: Player) -> bool {
        self.find_run(|p| p == player).is_some()
    }

    fn find_run(&self, accept: impl Fn(Player) -> bool) -> Option<Run> {
        for direction in Direction::ALL {
            for row in 0..self.rows() {
                for column in 0..self.columns() {
                    let Some(player) = self.cells()[self.index(row, column)].owner() else {
                        continue;
                    };
                    if accept(player) && self.run_from(row, column, direction, player) {
                        return Some(Run {
                            player,
                            row,
                            column,
                            direction,
                        });
                    }
                }
            }
        }
        None
    }

    /// True if the `k` cells from (`row`, `column`) along `direction` stay on
    /// the board and all hold `player`'s mark.
    fn run_from(&self, row: usize, column: usize, direction: Direction, player: Player) -> bool {
        let (dr, dc) = direction.delta();
        let last = self.k() as isize - 1;
        let end_row = row as isize + dr * last;
        let end_col = column as isize + dc * last;
        if end_row < 0
            || end_row >= self.rows() as isize
            || end_col < 0
            || end_col >= self.columns() as isize
        {
            return false;
        }

        let mark = Cell::from(player);
        (0..self.k() as isize).all(|i| {
            let r = (row as isize + dr * i) as usize;
            let c = (column as isize + dc * i) as usize;
            self.cells()[self.index(r, c)] == mark
        })
    }
}
