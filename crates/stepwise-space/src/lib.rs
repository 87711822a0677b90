//! Spatial types for Stepwise pathfinding engines.
//!
//! This crate defines the 4-connected [`Grid4`] lattice the A* engine
//! searches, the [`Cell`] coordinate, and the [`Heuristic`] distance
//! family used as cost-to-goal estimates.
//!
//! # Canonical order
//!
//! Neighbours are always produced North, South, West, East. Engines that
//! break ties by discovery order inherit this order, so it is part of the
//! observable behavior of every trace built on a grid.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod heuristic;

#[cfg(test)]
pub(crate) mod compliance;

pub use error::SpaceError;
pub use grid::{Cell, Grid4, NEIGHBOUR_OFFSETS};
pub use heuristic::Heuristic;
