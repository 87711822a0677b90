//! Test utilities and fixtures for Stepwise development.
//!
//! Provides a seeded random source, textbook problem instances in
//! [`fixtures`], a breadth-first grid distance to check A* against, and
//! [`assert_trace_well_formed`], the invariant checker every engine test
//! can run on its output.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use stepwise_core::rng::{seeded, EngineRng};
use stepwise_core::{Outcome, Simulation};
use stepwise_space::{Cell, Grid4};

/// Seed used by tests that do not care which seed they get.
pub const TEST_SEED: u64 = 0x5eed;

/// A deterministic generator for tests.
pub fn seeded_rng(seed: u64) -> EngineRng {
    seeded(seed)
}

/// Panic unless `sim` satisfies the trace invariants.
///
/// - `success` iff the outcome is `Solved`.
/// - Rejected runs have no steps; every other run has at least one.
/// - Step ids are `0..n` in order and match `metadata.step_count`.
pub fn assert_trace_well_formed(sim: &Simulation) {
    assert_eq!(
        sim.success,
        sim.outcome.is_success(),
        "success flag disagrees with outcome {:?}",
        sim.outcome
    );
    if matches!(sim.outcome, Outcome::InvalidParameter { .. }) {
        assert!(sim.steps.is_empty(), "rejected run recorded steps");
    } else {
        assert!(!sim.steps.is_empty(), "{} recorded no steps", sim.metadata.engine);
    }
    for (i, step) in sim.steps.iter().enumerate() {
        assert_eq!(step.id.0, i as u64, "step ids out of order at index {i}");
        assert!(!step.description.is_empty(), "step {i} has no description");
    }
    assert_eq!(sim.metadata.step_count, sim.steps.len());
}

/// Deserialize the result of a successful run.
pub fn result_as<T: DeserializeOwned>(sim: &Simulation) -> T {
    assert!(sim.success, "run failed: {:?}", sim.outcome);
    serde_json::from_value(sim.result.clone()).expect("result shape")
}

/// Shortest 4-connected path length by plain breadth-first search.
pub fn grid_bfs_distance(grid: &Grid4, start: Cell, goal: Cell) -> Option<u64> {
    if !grid.is_open(start) || !grid.is_open(goal) {
        return None;
    }
    let width = grid.cols() as usize;
    let index = |c: Cell| c.row as usize * width + c.col as usize;
    let mut dist: Vec<Option<u64>> = vec![None; grid.cell_count()];
    dist[index(start)] = Some(0);
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        let d = dist[index(cell)].unwrap_or(0);
        if cell == goal {
            return Some(d);
        }
        for next in grid.open_neighbours(cell) {
            if dist[index(next)].is_none() {
                dist[index(next)] = Some(d + 1);
                queue.push_back(next);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bfs_distance_on_open_grid() {
        let grid = Grid4::new(3, 4).unwrap();
        assert_eq!(grid_bfs_distance(&grid, Cell::new(0, 0), Cell::new(2, 3)), Some(5));
    }

    #[test]
    fn bfs_distance_blocked() {
        let grid = Grid4::from_rows(&[".#.", ".#.", ".#."]).unwrap();
        assert_eq!(grid_bfs_distance(&grid, Cell::new(0, 0), Cell::new(0, 2)), None);
    }

    #[test]
    fn detour_maze_distance() {
        let p = fixtures::maze(&fixtures::DETOUR_MAZE);
        assert_eq!(grid_bfs_distance(&p.grid, p.start, p.goal), Some(16));
    }
}
