//! Grid and heuristic compliance test helpers.
//!
//! These functions verify the invariants the A* engine relies on:
//! symmetric adjacency, canonical ordering, and admissibility of every
//! heuristic against true BFS distances.

use crate::grid::{Cell, Grid4};
use crate::heuristic::Heuristic;
use std::collections::VecDeque;

/// Unit-cost BFS distances from `source` over open cells.
pub fn bfs_distances(grid: &Grid4, source: Cell) -> Vec<Option<u32>> {
    let mut dist = vec![None; grid.cell_count()];
    let Some(start) = grid.canonical_rank(source) else {
        return dist;
    };
    if !grid.is_open(source) {
        return dist;
    }
    dist[start] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(cell) = queue.pop_front() {
        let d = dist[grid.canonical_rank(cell).unwrap()].unwrap();
        for nb in grid.open_neighbours(cell) {
            let i = grid.canonical_rank(nb).unwrap();
            if dist[i].is_none() {
                dist[i] = Some(d + 1);
                queue.push_back(nb);
            }
        }
    }
    dist
}

/// Assert that `b in neighbours(a)` implies `a in neighbours(b)`.
pub fn assert_neighbours_symmetric(grid: &Grid4) {
    for cell in grid.canonical_ordering() {
        for nb in grid.neighbours(cell) {
            assert!(
                grid.neighbours(nb).contains(&cell),
                "neighbour symmetry violated: {nb} in N({cell}) but {cell} not in N({nb})"
            );
        }
    }
}

/// Assert that canonical ordering visits every cell once in rank order.
pub fn assert_canonical_ordering_consistent(grid: &Grid4) {
    let order = grid.canonical_ordering();
    assert_eq!(order.len(), grid.cell_count());
    for (i, cell) in order.iter().enumerate() {
        assert_eq!(grid.canonical_rank(*cell), Some(i), "rank mismatch at {cell}");
    }
}

/// Assert no heuristic overestimates the BFS distance between open cells.
pub fn assert_heuristics_admissible(grid: &Grid4) {
    let cells: Vec<Cell> = grid
        .canonical_ordering()
        .into_iter()
        .filter(|&c| grid.is_open(c))
        .collect();
    for &goal in &cells {
        let dist = bfs_distances(grid, goal);
        for &cell in &cells {
            let Some(true_cost) = dist[grid.canonical_rank(cell).unwrap()] else {
                continue;
            };
            for h in Heuristic::ALL {
                let est = h.estimate(cell, goal);
                assert!(
                    est <= f64::from(true_cost) + 1e-9,
                    "{h} overestimates {cell}->{goal}: {est} > {true_cost}"
                );
            }
        }
    }
}

/// Run every compliance check.
pub fn run_full_compliance(grid: &Grid4) {
    assert_neighbours_symmetric(grid);
    assert_canonical_ordering_consistent(grid);
    assert_heuristics_admissible(grid);
}
