//! Benchmark profiles for the Stepwise engines.
//!
//! Each profile builds a deterministic problem instance from a seed, so
//! repeated benchmark runs measure the same work:
//!
//! - [`maze_profile`]: a square grid with scattered obstacles for A*.
//! - [`digraph_profile`]: a connected weighted digraph for the
//!   shortest-path engines.
//! - [`points_profile`]: uniform points for k-means and DBSCAN.
//! - [`text_profile`]: run-heavy text for the compression engines.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use rand::Rng;
use stepwise_core::rng::seeded;
use stepwise_engines::graph::{Graph, RootedGraph};
use stepwise_engines::pathfinding::GridProblem;
use stepwise_space::{Cell, Grid4, SpaceError};

/// Seed every profile is built with in the benches.
pub const REFERENCE_SEED: u64 = 42;

/// A `size`×`size` grid where each cell is blocked with probability
/// `density`, searched corner to corner.
///
/// The start and goal cells are always open. Whether a path exists
/// depends on the seed; a blocked instance still exercises the full
/// frontier drain.
pub fn maze_profile(size: u32, density: f64, seed: u64) -> Result<GridProblem, SpaceError> {
    let mut rng = seeded(seed);
    let start = Cell::new(0, 0);
    let goal = Cell::new(size as i32 - 1, size as i32 - 1);
    let mut obstacles = Vec::new();
    for row in 0..size as i32 {
        for col in 0..size as i32 {
            let cell = Cell::new(row, col);
            if cell != start && cell != goal && rng.random_bool(density) {
                obstacles.push(cell);
            }
        }
    }
    let grid = Grid4::with_obstacles(size, size, obstacles)?;
    Ok(GridProblem::new(grid, start, goal))
}

/// A directed graph on `nodes` nodes rooted at `n0`.
///
/// A spine `n0 -> n1 -> ...` keeps every node reachable; each node then
/// gets `extra_arcs` further arcs to random targets. Weights are whole
/// numbers in `1..=10`.
pub fn digraph_profile(nodes: usize, extra_arcs: usize, seed: u64) -> RootedGraph {
    let mut rng = seeded(seed);
    let names: Vec<String> = (0..nodes).map(|i| format!("n{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut graph = Graph::directed(&refs);
    for pair in refs.windows(2) {
        let weight = rng.random_range(1..=10) as f64;
        graph = graph.with_edge(pair[0], pair[1], weight);
    }
    for from in &refs {
        for _ in 0..extra_arcs {
            let to = refs[rng.random_range(0..nodes)];
            let weight = rng.random_range(1..=10) as f64;
            graph = graph.with_edge(from, to, weight);
        }
    }
    RootedGraph::new(graph, "n0")
}

/// `n` points drawn uniformly from `[0, 100)^dims`.
pub fn points_profile(n: usize, dims: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = seeded(seed);
    (0..n)
        .map(|_| (0..dims).map(|_| rng.random_range(0.0..100.0)).collect())
        .collect()
}

/// Text of `len` characters over `a..=h`, in runs of one to six repeats.
pub fn text_profile(len: usize, seed: u64) -> String {
    let mut rng = seeded(seed);
    let mut text = String::with_capacity(len);
    while text.len() < len {
        let ch = char::from(b'a' + rng.random_range(0..8u8));
        let run = rng.random_range(1..=6).min(len - text.len());
        text.extend(std::iter::repeat_n(ch, run));
    }
    text
}
