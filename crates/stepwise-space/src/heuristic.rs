//! Cost-to-goal estimates for grid search.

use crate::grid::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance heuristic between two grid cells.
///
/// With 4-connected unit-cost moves only [`Heuristic::Manhattan`] is
/// tight; Euclidean and Chebyshev never overestimate either, so all three
/// are admissible, but they guide the search less sharply and the
/// trace shows more expansions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Heuristic {
    /// `|dr| + |dc|`.
    #[default]
    Manhattan,
    /// `sqrt(dr² + dc²)`.
    Euclidean,
    /// `max(|dr|, |dc|)`.
    Chebyshev,
}

impl Heuristic {
    /// All heuristics, in declaration order.
    pub const ALL: [Heuristic; 3] = [Self::Manhattan, Self::Euclidean, Self::Chebyshev];

    /// Estimated cost from `a` to `b`.
    pub fn estimate(self, a: Cell, b: Cell) -> f64 {
        let dr = f64::from((a.row - b.row).abs());
        let dc = f64::from((a.col - b.col).abs());
        match self {
            Self::Manhattan => dr + dc,
            Self::Euclidean => (dr * dr + dc * dc).sqrt(),
            Self::Chebyshev => dr.max(dc),
        }
    }

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Manhattan => "manhattan",
            Self::Euclidean => "euclidean",
            Self::Chebyshev => "chebyshev",
        }
    }

    /// `true` when the estimate equals the true 4-connected cost on an
    /// obstacle-free grid.
    pub fn is_tight_for_4_connected(self) -> bool {
        matches!(self, Self::Manhattan)
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
