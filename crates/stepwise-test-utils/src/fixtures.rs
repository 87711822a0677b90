//! Reusable problem instances.
//!
//! Most of these are the textbook examples each algorithm is usually
//! taught with, so expected answers can be checked against the
//! literature:
//!
//! - [`textbook_processes`]: the four-process CPU scheduling example.
//! - [`textbook_disk_queue`]: head 53 on 200 cylinders.
//! - [`belady_references`]: the 20-reference page string.
//! - [`textbook_banker_state`]: five processes, three resource types.

use stepwise_core::rng::seeded;
use stepwise_engines::clustering::Blobs;
use stepwise_engines::graph::{Graph, RootedGraph};
use stepwise_engines::learning::{Dataset, Example};
use stepwise_engines::pathfinding::GridProblem;
use stepwise_engines::scheduling::{BankerState, DiskQueue, Process};
use stepwise_space::{Cell, Grid4};

/// Grid rows with a wall that forces a detour. `S` and `G` mark start
/// and goal; `#` is blocked.
pub const DETOUR_MAZE: [&str; 5] = [
    "S....",
    "####.",
    ".....",
    ".####",
    "....G",
];

/// Parse a maze whose start and goal are marked `S` and `G`.
///
/// Panics when a marker is missing or the rows are ragged.
pub fn maze(rows: &[&str]) -> GridProblem {
    let grid = Grid4::from_rows(rows).expect("maze rows");
    let find = |mark: char| {
        rows.iter()
            .enumerate()
            .find_map(|(r, line)| {
                line.chars()
                    .position(|c| c == mark)
                    .map(|c| Cell::new(r as i32, c as i32))
            })
            .unwrap_or_else(|| panic!("maze has no {mark}"))
    };
    GridProblem::new(grid, find('S'), find('G'))
}

/// An obstacle-free grid from the top-left to the bottom-right corner.
pub fn open_grid(rows: u32, cols: u32) -> GridProblem {
    let grid = Grid4::new(rows, cols).expect("grid size");
    GridProblem::new(
        grid,
        Cell::new(0, 0),
        Cell::new(rows as i32 - 1, cols as i32 - 1),
    )
}

/// Directed graph with non-negative weights where the direct edge
/// `A -> D` is longer than the route through `C` and `B`.
pub fn weighted_digraph() -> RootedGraph {
    let graph = Graph::directed(&["A", "B", "C", "D", "E"])
        .with_edge("A", "B", 4.0)
        .with_edge("A", "C", 1.0)
        .with_edge("C", "B", 2.0)
        .with_edge("B", "D", 1.0)
        .with_edge("A", "D", 7.0)
        .with_edge("C", "E", 5.0)
        .with_edge("D", "E", 1.0);
    RootedGraph::new(graph, "A")
}

/// Directed graph with a reachable cycle of total weight −1.
pub fn negative_cycle_digraph() -> RootedGraph {
    let graph = Graph::directed(&["S", "A", "B", "C"])
        .with_edge("S", "A", 1.0)
        .with_edge("A", "B", 1.0)
        .with_edge("B", "C", -3.0)
        .with_edge("C", "A", 1.0);
    RootedGraph::new(graph, "S")
}

/// Connected undirected graph with a unique minimum spanning tree of
/// weight 11.
pub fn spanning_graph() -> Graph {
    Graph::undirected(&["A", "B", "C", "D", "E"])
        .with_edge("A", "B", 2.0)
        .with_edge("A", "C", 3.0)
        .with_edge("B", "C", 1.0)
        .with_edge("B", "D", 4.0)
        .with_edge("C", "D", 5.0)
        .with_edge("D", "E", 4.0)
        .with_edge("C", "E", 6.0)
}

/// Five-day play/stay dataset over outlook and wind.
pub fn weather_dataset(query: &[&str]) -> Dataset {
    Dataset::new(
        &["outlook", "windy"],
        vec![
            Example::new(&["sunny", "no"], "play"),
            Example::new(&["sunny", "yes"], "stay"),
            Example::new(&["rainy", "yes"], "stay"),
            Example::new(&["overcast", "no"], "play"),
            Example::new(&["rainy", "no"], "play"),
        ],
        query,
    )
}

/// The bread/milk/diaper/beer market-basket transactions.
pub fn market_baskets() -> Vec<Vec<String>> {
    [
        &["bread", "milk"][..],
        &["bread", "diaper", "beer", "eggs"],
        &["milk", "diaper", "beer", "cola"],
        &["bread", "milk", "diaper", "beer"],
        &["bread", "milk", "diaper", "cola"],
    ]
    .iter()
    .map(|t| t.iter().map(|s| (*s).to_owned()).collect())
    .collect()
}

/// P1..P4 arriving at 0..3 with bursts 5, 3, 8, 6.
pub fn textbook_processes() -> Vec<Process> {
    vec![
        Process::new("P1", 0, 5),
        Process::new("P2", 1, 3),
        Process::new("P3", 2, 8),
        Process::new("P4", 3, 6),
    ]
}

/// Head at 53 on 200 cylinders with eight pending requests.
pub fn textbook_disk_queue() -> DiskQueue {
    DiskQueue::new(53, 200, &[98, 183, 37, 122, 14, 124, 65, 67])
}

/// The 20-reference string used for FIFO/LRU/OPT comparisons.
pub fn belady_references() -> Vec<u64> {
    vec![7, 0, 1, 2, 0, 3, 0, 4, 2, 3, 0, 3, 2, 1, 2, 0, 1, 7, 0, 1]
}

/// Five processes over three resource types in a safe state.
pub fn textbook_banker_state() -> BankerState {
    BankerState::new(
        vec![3, 3, 2],
        vec![
            vec![7, 5, 3],
            vec![3, 2, 2],
            vec![9, 0, 2],
            vec![2, 2, 2],
            vec![4, 3, 3],
        ],
        vec![
            vec![0, 1, 0],
            vec![2, 0, 0],
            vec![3, 0, 2],
            vec![2, 1, 1],
            vec![0, 0, 2],
        ],
    )
}

/// Two well-separated 2-D blobs of `per_blob` points each.
pub fn two_blobs(per_blob: usize, seed: u64) -> Vec<Vec<f64>> {
    let blobs = Blobs {
        centers: vec![vec![0.0, 0.0], vec![10.0, 10.0]],
        points_per_center: per_blob,
        spread: 0.5,
    };
    blobs.generate(&mut seeded(seed)).points
}

/// A schedule where T2 reads T1's uncommitted write and then aborts.
pub const DIRTY_READ_ABORT: &str = "W1(A); R2(A); C1; A2";

/// Two read-modify-write transactions that interleave into a lost update.
pub const LOST_UPDATE: &str = "R1(A); R2(A); W1(A); W2(A); C1; C2";
