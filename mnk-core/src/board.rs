//! Board state and move application.

use std::fmt;

use crate::error::{Error, IllegalMoveReason};
use crate::{Cell, Move, Outcome, Player};

/// An m,n,k position: the grid, the side to move and the cached result.
///
/// Cloning produces a fully independent copy, so solvers can branch into
/// alternative futures without ever mutating a parent. Equality and hashing
/// are symmetry-aware; see [`crate::CanonicalKey`].
#[derive(Clone, Debug)]
pub struct Board {
    rows: usize,
    columns: usize,
    k: usize,
    /// Row-major cell grid.
    cells: Vec<Cell>,
    to_move: Player,
    /// Set once the game is finished; no further moves are accepted.
    winner: Option<Outcome>,
    moves_remaining: usize,
}

fn check_dimensions(rows: usize, columns: usize, k: usize) -> Result<usize, Error> {
    let invalid = Error::InvalidDimension { rows, columns, k };
    if rows == 0 || columns == 0 || k == 0 || k > rows.max(columns) {
        return Err(invalid);
    }
    rows.checked_mul(columns).ok_or(invalid)
}

impl Board {
    /// Create an empty `rows × columns` board where `k` in a row wins.
    ///
    /// Fails with [`Error::InvalidDimension`] unless `rows >= 1`,
    /// `columns >= 1` and `1 <= k <= max(rows, columns)`.
    pub fn new(rows: usize, columns: usize, k: usize) -> Result<Board, Error> {
        let size = check_dimensions(rows, columns, k)?;
        Ok(Board {
            rows,
            columns,
            k,
            cells: vec![Cell::Empty; size],
            to_move: Player::One,
            winner: None,
            moves_remaining: size,
        })
    }

    /// Build a position from an explicit row-major grid.
    ///
    /// The side to move is derived from the mark counts. Grids that cannot
    /// arise from alternating play starting with Player One are rejected with
    /// [`Error::InvalidPosition`].
    pub fn from_cells(
        rows: usize,
        columns: usize,
        k: usize,
        cells: &[Cell],
    ) -> Result<Board, Error> {
        let size = check_dimensions(rows, columns, k)?;
        if cells.len() != size {
            return Err(Error::InvalidPosition {
                reason: format!("expected {} cells, got {}", size, cells.len()),
            });
        }

        let ones = cells.iter().filter(|&&c| c == Cell::One).count();
        let twos = cells.iter().filter(|&&c| c == Cell::Two).count();
        if ones != twos && ones != twos + 1 {
            return Err(Error::InvalidPosition {
                reason: format!("player 1 has {} marks and player 2 has {}", ones, twos),
            });
        }

        let mut board = Board {
            rows,
            columns,
            k,
            cells: cells.to_vec(),
            to_move: if ones == twos {
                Player::One
            } else {
                Player::Two
            },
            winner: None,
            moves_remaining: size - ones - twos,
        };

        // Whoever completed a run must have made the last move.
        let one_won = board.has_run(Player::One);
        let two_won = board.has_run(Player::Two);
        if (one_won && two_won) || (one_won && ones == twos) || (two_won && ones > twos) {
            return Err(Error::InvalidPosition {
                reason: "play continued after the game was decided".to_string(),
            });
        }

        // ...and that move must have completed every run on the board.
        let last_mover = board.to_move.opponent();
        if board.has_run(last_mover) && !board.has_deciding_cell(last_mover) {
            return Err(Error::InvalidPosition {
                reason: "runs could not all have been completed by the last move".to_string(),
            });
        }

        board.winner = board.evaluate();
        Ok(board)
    }

    /// True if clearing some mark of `player` leaves them without a run.
    fn has_deciding_cell(&self, player: Player) -> bool {
        let mark = Cell::from(player);
        let mut scratch = self.clone();
        (0..self.cells.len()).any(|idx| {
            if self.cells[idx] != mark {
                return false;
            }
            scratch.cells[idx] = Cell::Empty;
            let decided = !scratch.has_run(player);
            scratch.cells[idx] = mark;
            decided
        })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Run length needed to win.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// The row-major cell grid.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at (`row`, `column`), or None when out of bounds.
    #[inline]
    pub fn cell(&self, row: usize, column: usize) -> Option<Cell> {
        if row < self.rows && column < self.columns {
            Some(self.cells[self.index(row, column)])
        } else {
            None
        }
    }

    /// The player whose turn it is.
    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Result of the game if it is finished.
    #[inline]
    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    /// True once a player has won or the board is full.
    #[inline]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Number of empty cells.
    #[inline]
    pub fn moves_remaining(&self) -> usize {
        self.moves_remaining
    }

    /// Number of marks on the board.
    #[inline]
    pub fn marks_placed(&self) -> usize {
        self.cells.len() - self.moves_remaining
    }

    #[inline]
    pub(crate) fn index(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    /// Apply `mov`, placing the mover's mark and passing the turn.
    ///
    /// On failure the board is left untouched.
    pub fn apply_move(&mut self, mov: Move) -> Result<(), Error> {
        let illegal = |reason| Error::IllegalMove {
            row: mov.row,
            column: mov.column,
            reason,
        };

        if self.winner.is_some() {
            return Err(illegal(IllegalMoveReason::GameOver));
        }
        if mov.row >= self.rows || mov.column >= self.columns {
            return Err(illegal(IllegalMoveReason::OutOfBounds));
        }
        if mov.player != self.to_move {
            return Err(illegal(IllegalMoveReason::WrongPlayer));
        }
        let idx = self.index(mov.row, mov.column);
        if self.cells[idx] != Cell::Empty {
            return Err(illegal(IllegalMoveReason::Occupied));
        }

        self.place(idx);
        Ok(())
    }

    /// Play at (`row`, `column`) for the side to move.
    pub fn play(&mut self, row: usize, column: usize) -> Result<(), Error> {
        self.apply_move(Move::new(row, column, self.to_move))
    }

    /// Place the mover's mark at `idx`. Caller guarantees legality.
    pub(crate) fn place(&mut self, idx: usize) {
        debug_assert!(self.winner.is_none());
        debug_assert_eq!(self.cells[idx], Cell::Empty);

        self.cells[idx] = Cell::from(self.to_move);
        self.to_move = self.to_move.opponent();
        self.moves_remaining -= 1;
        self.winner = self.evaluate();
    }

    /// Rebuild a board of the same game from a transformed grid.
    pub(crate) fn with_cells(&self, rows: usize, columns: usize, cells: Vec<Cell>) -> Board {
        Board {
            rows,
            columns,
            k: self.k,
            cells,
            to_move: self.to_move,
            winner: self.winner,
            moves_remaining: self.moves_remaining,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(4 * self.columns - 3);
        for (i, row) in self.cells.chunks(self.columns).enumerate() {
            if i > 0 {
                writeln!(f, "{}", rule)?;
            }
            let line: Vec<String> = row.iter().map(|c| c.symbol().to_string()).collect();
            writeln!(f, "{}", line.join(" | "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_new() {
        let board = Board::new(3, 5, 4).unwrap();
        assert_eq!(board.rows(), 3);
        assert_eq!(board.columns(), 5);
        assert_eq!(board.k(), 4);
        assert_eq!(board.cells().len(), 15);
        assert_eq!(board.to_move(), Player::One);
        assert_eq!(board.winner(), None);
        assert_eq!(board.moves_remaining(), 15);
        assert_eq!(board.marks_placed(), 0);
    }

    #[test]
    fn test_invalid_dimensions() {
        for (rows, columns, k) in [(0, 3, 1), (3, 0, 1), (3, 3, 0), (3, 3, 4), (1, 1, 2)] {
            assert_eq!(
                Board::new(rows, columns, k).unwrap_err(),
                Error::InvalidDimension { rows, columns, k }
            );
        }
    }

    #[test]
    fn test_k_up_to_longer_side() {
        assert!(Board::new(3, 3, 3).is_ok());
        assert!(Board::new(3, 5, 5).is_ok());
        assert!(Board::new(5, 3, 5).is_ok());
        assert!(Board::new(3, 5, 6).is_err());
    }

    #[test]
    fn test_apply_move() {
        let mut board = Board::new(3, 3, 3).unwrap();
        board.apply_move(Move::new(1, 2, Player::One)).unwrap();

        assert_eq!(board.cell(1, 2), Some(Cell::One));
        assert_eq!(board.to_move(), Player::Two);
        assert_eq!(board.moves_remaining(), 8);
        assert_eq!(board.marks_placed(), 1);
    }

    #[test]
    fn test_occupied_cell_leaves_board_unchanged() {
        let mut board = Board::new(3, 3, 3).unwrap();
        board.play(0, 0).unwrap();
        let cells = board.cells().to_vec();

        let err = board.apply_move(Move::new(0, 0, Player::Two)).unwrap_err();
        assert_eq!(
            err,
            Error::IllegalMove {
                row: 0,
                column: 0,
                reason: IllegalMoveReason::Occupied
            }
        );
        assert_eq!(board.cells(), &cells[..]);
        assert_eq!(board.to_move(), Player::Two);
        assert_eq!(board.moves_remaining(), 8);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new(3, 5, 4).unwrap();
        let err = board.play(3, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalMove { reason: IllegalMoveReason::OutOfBounds, .. }
        ));
        let err = board.play(0, 5).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalMove { reason: IllegalMoveReason::OutOfBounds, .. }
        ));
        assert_eq!(board.moves_remaining(), 15);
    }

    #[test]
    fn test_wrong_player() {
        let mut board = Board::new(3, 3, 3).unwrap();
        let err = board.apply_move(Move::new(0, 0, Player::Two)).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalMove { reason: IllegalMoveReason::WrongPlayer, .. }
        ));
        assert_eq!(board.cell(0, 0), Some(Cell::Empty));
    }

    #[test]
    fn test_no_moves_after_win() {
        let mut board = Board::new(3, 3, 3).unwrap();
        for (r, c) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
            board.play(r, c).unwrap();
        }
        assert_eq!(board.winner(), Some(Outcome::Win(Player::One)));
        assert!(board.is_over());

        let err = board.play(2, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalMove { reason: IllegalMoveReason::GameOver, .. }
        ));
        assert_eq!(board.cell(2, 2), Some(Cell::Empty));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut parent = Board::new(3, 3, 3).unwrap();
        parent.play(1, 1).unwrap();

        let mut child = parent.clone();
        child.play(0, 0).unwrap();

        assert_eq!(parent.cell(0, 0), Some(Cell::Empty));
        assert_eq!(parent.to_move(), Player::Two);
        assert_eq!(child.cell(0, 0), Some(Cell::Two));
        assert_eq!(child.to_move(), Player::One);
    }

    #[test]
    fn test_from_cells_derives_turn() {
        use Cell::{Empty as E, One as O, Two as X};
        let board = Board::from_cells(2, 2, 2, &[O, X, O, E]).unwrap();
        assert_eq!(board.to_move(), Player::Two);
        assert_eq!(board.moves_remaining(), 1);
        assert_eq!(board.winner(), Some(Outcome::Win(Player::One)));

        let board = Board::from_cells(2, 2, 2, &[O, X, E, E]).unwrap();
        assert_eq!(board.to_move(), Player::One);
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_from_cells_rejects_bad_counts() {
        use Cell::{Empty as E, One as O, Two as X};
        assert!(matches!(
            Board::from_cells(2, 2, 2, &[X, E, E, E]),
            Err(Error::InvalidPosition { .. })
        ));
        assert!(matches!(
            Board::from_cells(2, 2, 2, &[O, O, E, E]),
            Err(Error::InvalidPosition { .. })
        ));
        assert!(matches!(
            Board::from_cells(2, 2, 2, &[O, E, E]),
            Err(Error::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_from_cells_rejects_play_after_win() {
        use Cell::{Empty as E, One as O, Two as X};
        // Player 1 completed the top row, then player 2 moved again.
        let cells = [O, O, O, X, X, E, X, E, E];
        assert!(matches!(
            Board::from_cells(3, 3, 3, &cells),
            Err(Error::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_from_cells_rejects_two_separate_runs() {
        use Cell::{Empty as E, One as O, Two as X};
        // O O O X X
        // X X O O O
        // X . . . .   no single move completes both rows.
        let cells = [O, O, O, X, X, X, X, O, O, O, X, E, E, E, E];
        assert!(matches!(
            Board::from_cells(3, 5, 3, &cells),
            Err(Error::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_from_cells_accepts_one_move_completing_two_runs() {
        use Cell::{Empty as E, One as O, Two as X};
        // The corner completed the top row and the left column at once.
        let cells = [O, O, O, O, X, X, O, X, X];
        let board = Board::from_cells(3, 3, 3, &cells).unwrap();
        assert_eq!(board.winner(), Some(Outcome::Win(Player::One)));

        // Four in a row with k = 3, finished by an inner mark.
        let cells = [O, O, O, O, X, X, E, X];
        let board = Board::from_cells(2, 4, 3, &cells).unwrap();
        assert_eq!(board.winner(), Some(Outcome::Win(Player::One)));
    }

    #[test]
    fn test_display() {
        let mut board = Board::new(2, 3, 2).unwrap();
        board.play(0, 0).unwrap();
        board.play(1, 2).unwrap();

        let rendered = board.to_string();
        assert_eq!(rendered, "O |   |  \n---------\n  |   | X\n");
    }
}
