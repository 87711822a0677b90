//! Search over grids and board states.
//!
//! - [`AStar`]: heuristic search on a 4-connected [`Grid4`](stepwise_space::Grid4)
//! - [`SlidingPuzzle`]: breadth-first search over sliding-tile boards

pub mod astar;
pub mod puzzle;

pub use astar::{AStar, AStarBuilder, AStarResult, GridProblem};
pub use puzzle::{PuzzleProblem, PuzzleResult, SlidingPuzzle};
