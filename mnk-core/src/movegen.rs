//! Legal move generation.
//!
//! Every empty cell is a legal move for the side to move. Moves are produced
//! in row-major order so that search order, and therefore statistics and
//! test fixtures, are reproducible.

use crate::{Board, Cell, Error, Move};

impl Board {
    /// All legal moves, row-major. Empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() {
            return Vec::new();
        }
        let player = self.to_move();
        let columns = self.columns();
        self.cells()
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(idx, _)| Move::new(idx / columns, idx % columns, player))
            .collect()
    }

    /// The position after `mov`, leaving `self` untouched.
    pub fn successor(&self, mov: Move) -> Result<Board, Error> {
        let mut child = self.clone();
        child.apply_move(mov)?;
        Ok(child)
    }

    /// Lazily produce each legal move together with the resulting position.
    pub fn successors(&self) -> Successors<'_> {
        Successors {
            board: self,
            next_idx: 0,
        }
    }
}

/// Iterator over `(move, child)` pairs of a position.
///
/// Children are independent copies; the parent is never modified.
pub struct Successors<'a> {
    board: &'a Board,
    /// Next cell index to scan.
    next_idx: usize,
}

impl Iterator for Successors<'_> {
    type Item = (Move, Board);

    fn next(&mut self) -> Option<(Move, Board)> {
        if self.board.is_over() {
            return None;
        }
        let cells = self.board.cells();
        while self.next_idx < cells.len() {
            let idx = self.next_idx;
            self.next_idx += 1;

            if cells[idx] == Cell::Empty {
                let columns = self.board.columns();
                let mov = Move::new(idx / columns, idx % columns, self.board.to_move());
                let mut child = self.board.clone();
                child.place(idx);
                return Some((mov, child));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Player;

    #[test]
    fn test_initial_position_move_count() {
        let board = Board::new(3, 5, 4).unwrap();
        assert_eq!(board.legal_moves().len(), 15);
        assert_eq!(board.successors().count(), 15);
    }

    #[test]
    fn test_row_major_order() {
        let mut board = Board::new(2, 3, 2).unwrap();
        board.play(0, 1).unwrap();

        let moves = board.legal_moves();
        let cells: Vec<(usize, usize)> = moves.iter().map(|m| (m.row, m.column)).collect();
        assert_eq!(cells, vec![(0, 0), (0, 2), (1, 0), (1, 1), (1, 2)]);
        assert!(moves.iter().all(|m| m.player == Player::Two));
    }

    #[test]
    fn test_successors_match_legal_moves() {
        let mut board = Board::new(3, 3, 3).unwrap();
        board.play(1, 1).unwrap();
        board.play(0, 0).unwrap();

        let legal = board.legal_moves();
        let successors: Vec<(Move, Board)> = board.successors().collect();
        assert_eq!(successors.len(), legal.len());

        for ((mov, child), expected) in successors.iter().zip(&legal) {
            assert_eq!(mov, expected);
            let mut applied = board.clone();
            applied.apply_move(*mov).unwrap();
            assert_eq!(child.cells(), applied.cells());
            assert_eq!(child.to_move(), applied.to_move());
        }
        // Parent untouched.
        assert_eq!(board.marks_placed(), 2);
    }

    #[test]
    fn test_successor() {
        let board = Board::new(3, 3, 3).unwrap();
        let child = board.successor(Move::new(2, 2, Player::One)).unwrap();
        assert_eq!(child.cell(2, 2), Some(Cell::One));
        assert_eq!(board.cell(2, 2), Some(Cell::Empty));

        assert!(child.successor(Move::new(2, 2, Player::Two)).is_err());
    }

    #[test]
    fn test_full_board_has_no_moves() {
        let mut board = Board::new(1, 2, 2).unwrap();
        board.play(0, 0).unwrap();
        board.play(0, 1).unwrap();
        assert_eq!(board.moves_remaining(), 0);
        assert!(board.legal_moves().is_empty());
        assert_eq!(board.successors().count(), 0);
    }

    #[test]
    fn test_finished_game_has_no_moves() {
        let mut board = Board::new(1, 3, 1).unwrap();
        board.play(0, 1).unwrap();
        assert!(board.is_over());
        assert!(board.legal_moves().is_empty());
        assert_eq!(board.successors().count(), 0);
    }
}
