//! Error types for space operations.

use crate::grid::Cell;
use std::fmt;

/// Errors arising from grid construction or cell queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// A cell is outside the bounds of the grid.
    CellOutOfBounds {
        /// The offending cell.
        cell: Cell,
        /// Human-readable description of the valid range.
        bounds: String,
    },
    /// Attempted to construct a grid with zero cells.
    EmptySpace,
    /// A dimension exceeds the representable coordinate range.
    DimensionTooLarge {
        /// Which dimension (`"rows"` or `"cols"`).
        name: &'static str,
        /// The rejected value.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },
    /// A textual grid had rows of unequal length.
    RaggedRows {
        /// Index of the first row whose length differs from row 0.
        row: usize,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellOutOfBounds { cell, bounds } => {
                write!(f, "cell {cell} out of bounds: {bounds}")
            }
            Self::EmptySpace => write!(f, "grid must have at least one cell"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} = {value} exceeds maximum {max}")
            }
            Self::RaggedRows { row } => {
                write!(f, "row {row} differs in length from row 0")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
