//! 2D square grid with 4-connected neighbourhood (N/S/W/E) and obstacles.

use crate::error::SpaceError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Neighbour offsets in canonical order: North, South, West, East.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A grid coordinate `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Row index, 0 at the top.
    pub row: i32,
    /// Column index, 0 at the left.
    pub col: i32,
}

impl Cell {
    /// Construct a cell.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}

/// A two-dimensional grid with 4-connected neighbourhood and blocked cells.
///
/// Cells outside the grid do not exist (absorbing edges): corners have
/// at most 2 neighbours, edges at most 3. Blocked cells are never
/// returned as neighbours but remain addressable.
///
/// # Examples
///
/// ```
/// use stepwise_space::{Cell, Grid4};
///
/// let grid = Grid4::from_rows(&[
///     "..#",
///     "...",
/// ]).unwrap();
/// assert_eq!(grid.cell_count(), 6);
/// assert!(grid.is_blocked(Cell::new(0, 2)));
///
/// // Corner (0, 0): south and east are open.
/// let n = grid.open_neighbours(Cell::new(0, 0));
/// assert_eq!(n.as_slice(), &[Cell::new(1, 0), Cell::new(0, 1)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid4 {
    rows: u32,
    cols: u32,
    blocked: Vec<bool>,
}

impl Grid4 {
    /// Maximum dimension size: coordinates use `i32`, so each axis must fit.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Create an obstacle-free grid with `rows * cols` cells.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` if either dimension is 0, or
    /// `Err(SpaceError::DimensionTooLarge)` if either exceeds `i32::MAX`.
    pub fn new(rows: u32, cols: u32) -> Result<Self, SpaceError> {
        if rows == 0 || cols == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if rows > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "rows",
                value: rows,
                max: Self::MAX_DIM,
            });
        }
        if cols > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "cols",
                value: cols,
                max: Self::MAX_DIM,
            });
        }
        Ok(Self {
            rows,
            cols,
            blocked: vec![false; (rows as usize) * (cols as usize)],
        })
    }

    /// Create a grid and block every listed cell.
    pub fn with_obstacles(
        rows: u32,
        cols: u32,
        obstacles: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, SpaceError> {
        let mut grid = Self::new(rows, cols)?;
        for cell in obstacles {
            grid.set_blocked(cell, true)?;
        }
        Ok(grid)
    }

    /// Parse a grid from text rows: `#` is blocked, anything else is open.
    pub fn from_rows(rows: &[&str]) -> Result<Self, SpaceError> {
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut grid = Self::new(rows.len() as u32, width as u32)?;
        for (r, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(SpaceError::RaggedRows { row: r });
            }
            for (c, ch) in line.chars().enumerate() {
                if ch == '#' {
                    grid.set_blocked(Cell::new(r as i32, c as i32), true)?;
                }
            }
        }
        Ok(grid)
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Total number of cells, blocked or not.
    pub fn cell_count(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }

    /// `true` if `cell` lies inside the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.row < self.rows as i32 && cell.col >= 0 && cell.col < self.cols as i32
    }

    /// Check that `cell` lies inside the grid.
    pub fn check_bounds(&self, cell: Cell) -> Result<(), SpaceError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(SpaceError::CellOutOfBounds {
                cell,
                bounds: format!("[0, {}) x [0, {})", self.rows, self.cols),
            })
        }
    }

    /// Block or unblock a cell.
    pub fn set_blocked(&mut self, cell: Cell, blocked: bool) -> Result<(), SpaceError> {
        self.check_bounds(cell)?;
        let idx = self.rank_unchecked(cell);
        self.blocked[idx] = blocked;
        Ok(())
    }

    /// `true` if `cell` is inside the grid and blocked.
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.canonical_rank(cell).is_some_and(|i| self.blocked[i])
    }

    /// `true` if `cell` is inside the grid and not blocked.
    pub fn is_open(&self, cell: Cell) -> bool {
        self.canonical_rank(cell).is_some_and(|i| !self.blocked[i])
    }

    /// Blocked cells in canonical order.
    pub fn obstacles(&self) -> Vec<Cell> {
        self.canonical_ordering()
            .into_iter()
            .filter(|&c| self.is_blocked(c))
            .collect()
    }

    /// In-bounds 4-connected neighbours of `cell`, in canonical order,
    /// regardless of obstacles.
    pub fn neighbours(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(|&(dr, dc)| Cell::new(cell.row + dr, cell.col + dc))
            .filter(|&n| self.contains(n))
            .collect()
    }

    /// Open 4-connected neighbours of `cell`, in canonical order.
    pub fn open_neighbours(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        self.neighbours(cell)
            .into_iter()
            .filter(|&n| self.is_open(n))
            .collect()
    }

    /// All cells in row-major order.
    pub fn canonical_ordering(&self) -> Vec<Cell> {
        let mut out = Vec::with_capacity(self.cell_count());
        for r in 0..self.rows as i32 {
            for c in 0..self.cols as i32 {
                out.push(Cell::new(r, c));
            }
        }
        out
    }

    /// Row-major index of `cell`, or `None` if out of bounds.
    pub fn canonical_rank(&self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some(self.rank_unchecked(cell))
        } else {
            None
        }
    }

    /// The cell at a row-major index, or `None` past the end.
    pub fn cell_at(&self, rank: usize) -> Option<Cell> {
        if rank < self.cell_count() {
            let cols = self.cols as usize;
            Some(Cell::new((rank / cols) as i32, (rank % cols) as i32))
        } else {
            None
        }
    }

    fn rank_unchecked(&self, cell: Cell) -> usize {
        (cell.row as usize) * (self.cols as usize) + (cell.col as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;
    use proptest::prelude::*;

    fn c(r: i32, col: i32) -> Cell {
        Cell::new(r, col)
    }

    // ── Neighbour tests ─────────────────────────────────────────

    #[test]
    fn neighbours_interior_canonical_order() {
        let g = Grid4::new(5, 5).unwrap();
        let n = g.neighbours(c(2, 2));
        assert_eq!(n.as_slice(), &[c(1, 2), c(3, 2), c(2, 1), c(2, 3)]);
    }

    #[test]
    fn neighbours_corner() {
        let g = Grid4::new(5, 5).unwrap();
        let n = g.neighbours(c(0, 0));
        assert_eq!(n.as_slice(), &[c(1, 0), c(0, 1)]);
    }

    #[test]
    fn neighbours_edge() {
        let g = Grid4::new(5, 5).unwrap();
        assert_eq!(g.neighbours(c(0, 2)).len(), 3);
    }

    #[test]
    fn open_neighbours_skip_obstacles() {
        let g = Grid4::with_obstacles(3, 3, [c(0, 1), c(1, 0)]).unwrap();
        assert!(g.open_neighbours(c(0, 0)).is_empty());
        assert_eq!(g.neighbours(c(0, 0)).len(), 2);
    }

    #[test]
    fn single_cell_has_no_neighbours() {
        let g = Grid4::new(1, 1).unwrap();
        assert!(g.neighbours(c(0, 0)).is_empty());
    }

    // ── Constructor tests ───────────────────────────────────────

    #[test]
    fn new_zero_rows_returns_error() {
        assert_eq!(Grid4::new(0, 5), Err(SpaceError::EmptySpace));
        assert_eq!(Grid4::new(5, 0), Err(SpaceError::EmptySpace));
    }

    #[test]
    fn new_rejects_dims_exceeding_i32_max() {
        let big = i32::MAX as u32 + 1;
        assert!(matches!(
            Grid4::new(big, 1),
            Err(SpaceError::DimensionTooLarge { name: "rows", .. })
        ));
        assert!(matches!(
            Grid4::new(1, big),
            Err(SpaceError::DimensionTooLarge { name: "cols", .. })
        ));
    }

    #[test]
    fn obstacle_out_of_bounds_rejected() {
        let err = Grid4::with_obstacles(2, 2, [c(2, 0)]).unwrap_err();
        assert!(matches!(err, SpaceError::CellOutOfBounds { .. }));
    }

    #[test]
    fn from_rows_parses_obstacles() {
        let g = Grid4::from_rows(&[".#.", "..#"]).unwrap();
        assert_eq!(g.rows(), 2);
        assert_eq!(g.cols(), 3);
        assert_eq!(g.obstacles(), vec![c(0, 1), c(1, 2)]);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert_eq!(
            Grid4::from_rows(&["...", ".."]),
            Err(SpaceError::RaggedRows { row: 1 })
        );
    }

    // ── Rank tests ──────────────────────────────────────────────

    #[test]
    fn rank_roundtrips_through_cell_at() {
        let g = Grid4::new(3, 4).unwrap();
        for (i, cell) in g.canonical_ordering().into_iter().enumerate() {
            assert_eq!(g.canonical_rank(cell), Some(i));
            assert_eq!(g.cell_at(i), Some(cell));
        }
        assert_eq!(g.cell_at(12), None);
        assert_eq!(g.canonical_rank(c(-1, 0)), None);
    }

    #[test]
    fn compliance_open_grid() {
        let g = Grid4::new(6, 6).unwrap();
        compliance::run_full_compliance(&g);
    }

    #[test]
    fn compliance_with_obstacles() {
        let g = Grid4::from_rows(&["..#..", ".#...", "...#.", "#...."]).unwrap();
        compliance::run_full_compliance(&g);
    }

    proptest! {
        #[test]
        fn neighbours_symmetric(
            rows in 1u32..10,
            cols in 1u32..10,
            r in 0i32..10, col in 0i32..10,
        ) {
            let r = r % rows as i32;
            let col = col % cols as i32;
            let g = Grid4::new(rows, cols).unwrap();
            let cell = c(r, col);
            for nb in g.neighbours(cell) {
                prop_assert!(
                    g.neighbours(nb).contains(&cell),
                    "neighbour symmetry violated: {} in N({}) but not vice versa",
                    nb, cell,
                );
            }
        }
    }
}
