//! Board symmetries and canonicalization.
//!
//! The symmetries of a square board are the 8 elements of the dihedral group
//! D4. A non-square rectangle is only mapped onto itself by the identity, the
//! 180° rotation and the two axis reflections; quarter turns and diagonal
//! reflections swap its shape.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::{Board, Cell, Player};

/// One element of D4.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Symmetry {
    Identity,
    /// Quarter turn clockwise.
    Rotate90,
    Rotate180,
    /// Quarter turn counter-clockwise.
    Rotate270,
    /// Mirror left-right.
    FlipHorizontal,
    /// Mirror top-bottom.
    FlipVertical,
    /// Reflect across the main diagonal.
    Transpose,
    /// Reflect across the anti-diagonal.
    AntiTranspose,
}

impl Symmetry {
    pub const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Rotate90,
        Symmetry::Rotate180,
        Symmetry::Rotate270,
        Symmetry::FlipHorizontal,
        Symmetry::FlipVertical,
        Symmetry::Transpose,
        Symmetry::AntiTranspose,
    ];

    /// Shape-preserving subgroup for a non-square rectangle.
    pub const RECTANGLE: [Symmetry; 4] = [
        Symmetry::Identity,
        Symmetry::Rotate180,
        Symmetry::FlipHorizontal,
        Symmetry::FlipVertical,
    ];

    /// Symmetries that map a `rows × columns` board onto itself.
    pub fn applicable(rows: usize, columns: usize) -> &'static [Symmetry] {
        if rows == columns {
            &Self::ALL
        } else {
            &Self::RECTANGLE
        }
    }

    /// True for the transforms that exchange rows and columns.
    #[inline]
    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            Symmetry::Rotate90 | Symmetry::Rotate270 | Symmetry::Transpose | Symmetry::AntiTranspose
        )
    }

    /// Shape of the image of a `rows × columns` board.
    #[inline]
    pub fn output_shape(self, rows: usize, columns: usize) -> (usize, usize) {
        if self.swaps_axes() {
            (columns, rows)
        } else {
            (rows, columns)
        }
    }

    /// Source cell of a `rows × columns` board that lands on (`row`, `column`)
    /// of the image.
    #[inline]
    pub fn source(self, row: usize, column: usize, rows: usize, columns: usize) -> (usize, usize) {
        match self {
            Symmetry::Identity => (row, column),
            Symmetry::Rotate90 => (rows - 1 - column, row),
            Symmetry::Rotate180 => (rows - 1 - row, columns - 1 - column),
            Symmetry::Rotate270 => (column, columns - 1 - row),
            Symmetry::FlipHorizontal => (row, columns - 1 - column),
            Symmetry::FlipVertical => (rows - 1 - row, column),
            Symmetry::Transpose => (column, row),
            Symmetry::AntiTranspose => (rows - 1 - column, columns - 1 - row),
        }
    }

    /// Compare the image of `board` under this symmetry with `grid`, cell by
    /// cell in row-major order, without materializing the image.
    fn cmp_image(self, board: &Board, grid: &[Cell]) -> Ordering {
        let (rows, columns) = (board.rows(), board.columns());
        let (out_rows, out_columns) = self.output_shape(rows, columns);
        let cells = board.cells();

        for r in 0..out_rows {
            for c in 0..out_columns {
                let (sr, sc) = self.source(r, c, rows, columns);
                match cells[sr * columns + sc].cmp(&grid[r * out_columns + c]) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
        }
        Ordering::Equal
    }

    fn image(self, board: &Board) -> Vec<Cell> {
        let (rows, columns) = (board.rows(), board.columns());
        let (out_rows, out_columns) = self.output_shape(rows, columns);
        let cells = board.cells();

        let mut image = Vec::with_capacity(cells.len());
        for r in 0..out_rows {
            for c in 0..out_columns {
                let (sr, sc) = self.source(r, c, rows, columns);
                image.push(cells[sr * columns + sc]);
            }
        }
        image
    }
}

/// How solvers key their tables.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum KeyMode {
    /// Collapse positions related by a board symmetry.
    #[default]
    Symmetric,
    /// Key on the raw grid.
    Raw,
}

/// Symmetry-minimal grid plus side to move.
///
/// Positions with equal keys (on the same board shape) have the same game
/// value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CanonicalKey {
    cells: Box<[Cell]>,
    to_move: Player,
}

impl CanonicalKey {
    pub fn new(cells: Box<[Cell]>, to_move: Player) -> CanonicalKey {
        CanonicalKey { cells, to_move }
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Pack the grid at 2 bits per cell, 4 cells per byte, first cell in the
    /// low bits of the first byte.
    pub fn packed_cells(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.cells.len().div_ceil(4)];
        for (i, &cell) in self.cells.iter().enumerate() {
            bytes[i / 4] |= (cell as u8) << ((i % 4) * 2);
        }
        bytes
    }

    /// Inverse of [`CanonicalKey::packed_cells`]. Returns None on a short
    /// buffer or an invalid 2-bit code.
    pub fn from_packed(bytes: &[u8], cell_count: usize, to_move: Player) -> Option<CanonicalKey> {
        if bytes.len() < cell_count.div_ceil(4) {
            return None;
        }
        let cells = (0..cell_count)
            .map(|i| Cell::from_bits((bytes[i / 4] >> ((i % 4) * 2)) & 0b11))
            .collect::<Option<Vec<Cell>>>()?;
        Some(CanonicalKey::new(cells.into_boxed_slice(), to_move))
    }
}

impl Board {
    /// Apply `symmetry` to the board. Quarter turns and diagonal reflections
    /// of a non-square board change its shape.
    pub fn transformed(&self, symmetry: Symmetry) -> Board {
        let (rows, columns) = symmetry.output_shape(self.rows(), self.columns());
        self.with_cells(rows, columns, symmetry.image(self))
    }

    /// Lexicographically smallest grid among the images of this board under
    /// its applicable symmetries.
    pub fn canonical_cells(&self) -> Vec<Cell> {
        let mut best: Option<Vec<Cell>> = None;
        for &symmetry in Symmetry::applicable(self.rows(), self.columns()) {
            if symmetry == Symmetry::Identity {
                continue;
            }
            let current = best.as_deref().unwrap_or(self.cells());
            if symmetry.cmp_image(self, current) == Ordering::Less {
                best = Some(symmetry.image(self));
            }
        }
        best.unwrap_or_else(|| self.cells().to_vec())
    }

    /// Canonical key: symmetry-minimal grid plus side to move.
    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new(self.canonical_cells().into_boxed_slice(), self.to_move())
    }

    /// Table key under the given mode.
    pub fn key(&self, mode: KeyMode) -> CanonicalKey {
        match mode {
            KeyMode::Symmetric => self.canonical_key(),
            KeyMode::Raw => CanonicalKey::new(self.cells().into(), self.to_move()),
        }
    }
}

/// Boards are equal when they belong to the same game and are related by a
/// board symmetry with the same side to move.
impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.rows() == other.rows()
            && self.columns() == other.columns()
            && self.k() == other.k()
            && self.canonical_key() == other.canonical_key()
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows().hash(state);
        self.columns().hash(state);
        self.k().hash(state);
        self.canonical_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(board: &Board) -> u64 {
        let mut hasher = DefaultHasher::new();
        board.hash(&mut hasher);
        hasher.finish()
    }

    fn with_marks(rows: usize, columns: usize, k: usize, moves: &[(usize, usize)]) -> Board {
        let mut board = Board::new(rows, columns, k).unwrap();
        for &(r, c) in moves {
            board.play(r, c).unwrap();
        }
        board
    }

    #[test]
    fn test_identity_transform() {
        let board = with_marks(3, 3, 3, &[(0, 0), (1, 1)]);
        assert_eq!(board.transformed(Symmetry::Identity).cells(), board.cells());
    }

    #[test]
    fn test_rotate_90() {
        let board = with_marks(3, 3, 3, &[(0, 0)]);
        // Clockwise quarter turn: top-left goes to top-right.
        let rotated = board.transformed(Symmetry::Rotate90);
        assert_eq!(rotated.cell(0, 2), Some(Cell::One));
        assert_eq!(rotated.cell(0, 0), Some(Cell::Empty));
    }

    #[test]
    fn test_rotate_180() {
        let board = with_marks(3, 3, 3, &[(0, 0)]);
        let rotated = board.transformed(Symmetry::Rotate180);
        assert_eq!(rotated.cell(2, 2), Some(Cell::One));
        assert_eq!(rotated.cell(0, 0), Some(Cell::Empty));
    }

    #[test]
    fn test_rotate_270() {
        let board = with_marks(3, 3, 3, &[(0, 0)]);
        let rotated = board.transformed(Symmetry::Rotate270);
        assert_eq!(rotated.cell(2, 0), Some(Cell::One));
        assert_eq!(rotated.cell(0, 0), Some(Cell::Empty));
    }

    #[test]
    fn test_rotate_360_identity() {
        for (rows, columns, k) in [(3, 3, 3), (3, 5, 4)] {
            let board = with_marks(rows, columns, k, &[(0, 0), (1, 2), (2, 1)]);
            let mut current = board.clone();
            for _ in 0..4 {
                current = current.transformed(Symmetry::Rotate90);
            }
            assert_eq!(current.rows(), rows);
            assert_eq!(current.cells(), board.cells());
        }
    }

    #[test]
    fn test_quarter_turn_matches_three_quarter_inverse() {
        let board = with_marks(3, 5, 4, &[(0, 0), (2, 3), (1, 4)]);
        let there = board.transformed(Symmetry::Rotate90);
        assert_eq!((there.rows(), there.columns()), (5, 3));
        let back = there.transformed(Symmetry::Rotate270);
        assert_eq!(back.cells(), board.cells());
    }

    #[test]
    fn test_reflect_twice_identity() {
        let board = with_marks(4, 4, 3, &[(0, 0), (0, 1), (3, 2)]);
        for symmetry in [
            Symmetry::FlipHorizontal,
            Symmetry::FlipVertical,
            Symmetry::Transpose,
            Symmetry::AntiTranspose,
        ] {
            let twice = board.transformed(symmetry).transformed(symmetry);
            assert_eq!(twice.cells(), board.cells(), "{:?} applied twice", symmetry);
        }
    }

    #[test]
    fn test_center_invariant() {
        let board = with_marks(3, 3, 3, &[(1, 1)]);
        for symmetry in Symmetry::ALL {
            assert_eq!(
                board.transformed(symmetry).cell(1, 1),
                Some(Cell::One),
                "{:?} should preserve the center",
                symmetry
            );
        }
    }

    #[test]
    fn test_all_corners_same_canonical() {
        let keys: Vec<CanonicalKey> = [(0, 0), (0, 2), (2, 0), (2, 2)]
            .iter()
            .map(|&m| with_marks(3, 3, 3, &[m]).canonical_key())
            .collect();
        for key in &keys[1..] {
            assert_eq!(*key, keys[0]);
        }
    }

    #[test]
    fn test_all_edges_same_canonical() {
        let keys: Vec<CanonicalKey> = [(0, 1), (1, 0), (1, 2), (2, 1)]
            .iter()
            .map(|&m| with_marks(3, 3, 3, &[m]).canonical_key())
            .collect();
        for key in &keys[1..] {
            assert_eq!(*key, keys[0]);
        }
        assert_ne!(keys[0], with_marks(3, 3, 3, &[(0, 0)]).canonical_key());
    }

    #[test]
    fn test_canonical_is_minimum() {
        let board = with_marks(3, 3, 3, &[(2, 2), (0, 1)]);
        let canonical = board.canonical_cells();
        for symmetry in Symmetry::ALL {
            assert!(canonical.as_slice() <= board.transformed(symmetry).cells());
        }
    }

    #[test]
    fn test_canonical_idempotent() {
        let board = with_marks(3, 3, 3, &[(2, 2), (0, 1), (1, 0)]);
        let canonical = board.canonical_cells();
        let again = Board::from_cells(3, 3, 3, &canonical).unwrap();
        assert_eq!(again.canonical_cells(), canonical);
    }

    #[test]
    fn test_applicable_counts() {
        assert_eq!(Symmetry::applicable(3, 3).len(), 8);
        assert_eq!(Symmetry::applicable(3, 5).len(), 4);
        assert!(!Symmetry::applicable(3, 5).contains(&Symmetry::Rotate90));
    }

    #[test]
    fn test_rectangle_uses_shape_preserving_subgroup() {
        let board = with_marks(3, 5, 4, &[(0, 0), (1, 3)]);

        let half_turn = board.transformed(Symmetry::Rotate180);
        assert_eq!(half_turn, board);
        assert_eq!(hash_of(&half_turn), hash_of(&board));

        let quarter_turn = board.transformed(Symmetry::Rotate90);
        assert_eq!((quarter_turn.rows(), quarter_turn.columns()), (5, 3));
        assert_ne!(quarter_turn, board);
    }

    #[test]
    fn test_rectangle_reflections_collapse() {
        let left = with_marks(3, 5, 4, &[(0, 0)]);
        let right = with_marks(3, 5, 4, &[(0, 4)]);
        let bottom = with_marks(3, 5, 4, &[(2, 0)]);
        let middle = with_marks(3, 5, 4, &[(0, 2)]);
        assert_eq!(left, right);
        assert_eq!(left, bottom);
        assert_ne!(left, middle);
    }

    #[test]
    fn test_equal_boards_hash_equal() {
        let board = with_marks(4, 4, 3, &[(0, 1), (2, 3), (3, 3)]);
        for &symmetry in Symmetry::applicable(4, 4) {
            let image = board.transformed(symmetry);
            assert_eq!(image, board);
            assert_eq!(hash_of(&image), hash_of(&board));
        }
    }

    #[test]
    fn test_different_k_not_equal() {
        let a = Board::new(3, 3, 3).unwrap();
        let b = Board::new(3, 3, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_includes_side_to_move() {
        let cells: Box<[Cell]> = vec![Cell::Empty; 4].into();
        let one = CanonicalKey::new(cells.clone(), Player::One);
        let two = CanonicalKey::new(cells, Player::Two);
        assert_ne!(one, two);
    }

    #[test]
    fn test_raw_key_keeps_orientation() {
        let a = with_marks(3, 3, 3, &[(0, 0)]);
        let b = with_marks(3, 3, 3, &[(2, 2)]);
        assert_eq!(a.key(KeyMode::Symmetric), b.key(KeyMode::Symmetric));
        assert_ne!(a.key(KeyMode::Raw), b.key(KeyMode::Raw));
    }

    #[test]
    fn test_packed_cells() {
        let key = with_marks(3, 5, 4, &[(0, 0), (2, 4), (1, 2)]).key(KeyMode::Raw);
        let packed = key.packed_cells();
        assert_eq!(packed.len(), 4);
        let back = CanonicalKey::from_packed(&packed, 15, key.to_move()).unwrap();
        assert_eq!(back, key);
        assert_eq!(CanonicalKey::from_packed(&packed[..3], 15, Player::One), None);
        assert_eq!(CanonicalKey::from_packed(&[0b11], 1, Player::One), None);
    }
}
