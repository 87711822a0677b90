//! Textbook graph algorithms over a shared [`Graph`] model.
//!
//! Adjacency is visited in edge-list order and ties between nodes are
//! broken by position in the node list.

pub mod bellman_ford;
pub mod dijkstra;
pub mod kruskal;
pub mod model;
pub mod prim;
pub mod traversal;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use bellman_ford::{BellmanFord, BellmanFordResult};
pub use dijkstra::Dijkstra;
pub use kruskal::Kruskal;
pub use model::{Arc, Edge, Graph, RootedGraph};
pub use prim::Prim;
pub use traversal::{Traversal, TraversalOrder, TraversalResult};

/// Distances and predecessors from a single source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortestPaths {
    /// Distance per node in node order; `None` when unreachable.
    pub distances: IndexMap<String, Option<f64>>,
    /// Predecessor on a shortest path per node.
    pub previous: IndexMap<String, Option<String>>,
    /// Nodes in the order their distance became final.
    pub order: Vec<String>,
}

/// Edges chosen for a spanning tree or forest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanningTree {
    /// Accepted edges in acceptance order.
    pub edges: Vec<Edge>,
    /// Sum of accepted weights.
    pub total_weight: f64,
    /// `true` when the edges connect every node.
    pub spanning: bool,
}

/// Per-node values keyed by node name, in node order.
pub(crate) fn named<T: Clone>(graph: &Graph, values: &[T]) -> IndexMap<String, T> {
    graph.nodes.iter().cloned().zip(values.iter().cloned()).collect()
}

pub(crate) fn name_of(graph: &Graph, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| graph.nodes.get(i)).cloned()
}

pub(crate) fn names(graph: &Graph, indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .filter_map(|&i| graph.nodes.get(i).cloned())
        .collect()
}

/// Working state shared by the single-source shortest-path engines.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DistanceSnapshot {
    pub current: Option<String>,
    pub distances: IndexMap<String, Option<f64>>,
    pub previous: IndexMap<String, Option<String>>,
    pub finalized: Vec<String>,
}

impl DistanceSnapshot {
    pub fn capture(
        graph: &Graph,
        current: Option<usize>,
        dist: &[Option<f64>],
        prev: &[Option<usize>],
        finalized: &[usize],
    ) -> Self {
        let previous: Vec<Option<String>> = prev.iter().map(|&p| name_of(graph, p)).collect();
        Self {
            current: name_of(graph, current),
            distances: named(graph, dist),
            previous: named(graph, &previous),
            finalized: names(graph, finalized),
        }
    }
}

/// `"∞"` for an unreached node, the number otherwise.
pub(crate) fn show(d: Option<f64>) -> String {
    d.map_or_else(|| "∞".to_owned(), |d| d.to_string())
}
