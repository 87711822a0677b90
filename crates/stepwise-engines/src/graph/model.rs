//! Weighted graph input shared by the graph engines.

use serde::{Deserialize, Serialize};
use stepwise_core::ParamError;

/// A weighted edge between two named nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node name.
    pub from: String,
    /// Target node name.
    pub to: String,
    /// Edge weight; must be finite.
    pub weight: f64,
}

/// A graph given as named nodes and an edge list.
///
/// Node order and edge order are significant: they are the canonical
/// tie-break orders for every graph engine. An undirected edge is
/// traversable both ways and appears in both endpoints' adjacency at
/// the position of the edge in `edges`.
///
/// # Examples
///
/// ```
/// use stepwise_engines::graph::Graph;
///
/// let g = Graph::undirected(&["A", "B", "C"])
///     .with_edge("A", "B", 1.0)
///     .with_edge("B", "C", 2.5);
/// assert!(g.validate().is_ok());
/// assert_eq!(g.index_of("C"), Some(2));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Node names in canonical order.
    pub nodes: Vec<String>,
    /// Edges in canonical order.
    pub edges: Vec<Edge>,
    /// Whether edges are one-way.
    pub directed: bool,
}

/// One entry of an adjacency list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arc {
    /// Index of the far endpoint.
    pub to: usize,
    /// Edge weight.
    pub weight: f64,
    /// Position of the originating edge in [`Graph::edges`].
    pub edge: usize,
}

impl Graph {
    /// An undirected graph with the given nodes and no edges.
    pub fn undirected(nodes: &[&str]) -> Self {
        Self {
            nodes: nodes.iter().map(|s| (*s).to_owned()).collect(),
            edges: Vec::new(),
            directed: false,
        }
    }

    /// A directed graph with the given nodes and no edges.
    pub fn directed(nodes: &[&str]) -> Self {
        Self {
            directed: true,
            ..Self::undirected(nodes)
        }
    }

    /// Append an edge.
    pub fn with_edge(mut self, from: &str, to: &str, weight: f64) -> Self {
        self.edges.push(Edge {
            from: from.to_owned(),
            to: to.to_owned(),
            weight,
        });
        self
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Position of a node name in [`nodes`](Graph::nodes).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n == name)
    }

    /// Check node names are unique and non-empty, edges reference known
    /// nodes, and weights are finite.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.nodes.is_empty() {
            return Err(ParamError::Empty { name: "nodes" });
        }
        for (i, name) in self.nodes.iter().enumerate() {
            if self.nodes[..i].contains(name) {
                return Err(ParamError::inconsistent(format!(
                    "node '{name}' is listed twice"
                )));
            }
        }
        for edge in &self.edges {
            for end in [&edge.from, &edge.to] {
                if self.index_of(end).is_none() {
                    return Err(ParamError::unknown("edges", end));
                }
            }
            if !edge.weight.is_finite() {
                return Err(ParamError::out_of_range(
                    "weight",
                    edge.weight,
                    "a finite number",
                ));
            }
        }
        Ok(())
    }

    /// Resolve a node name, for engine boundary checks.
    pub fn require_node(&self, name: &'static str, value: &str) -> Result<usize, ParamError> {
        self.index_of(value)
            .ok_or_else(|| ParamError::unknown(name, value))
    }

    /// Endpoints of edge `i` as node indices. Assumes a validated graph.
    pub fn endpoints(&self, i: usize) -> Option<(usize, usize)> {
        let edge = self.edges.get(i)?;
        Some((self.index_of(&edge.from)?, self.index_of(&edge.to)?))
    }

    /// Outgoing arcs per node, each list in edge order.
    pub fn adjacency(&self) -> Vec<Vec<Arc>> {
        let mut adj = vec![Vec::new(); self.nodes.len()];
        for (i, edge) in self.edges.iter().enumerate() {
            let Some((u, v)) = self.endpoints(i) else {
                continue;
            };
            adj[u].push(Arc {
                to: v,
                weight: edge.weight,
                edge: i,
            });
            if !self.directed && u != v {
                adj[v].push(Arc {
                    to: u,
                    weight: edge.weight,
                    edge: i,
                });
            }
        }
        adj
    }

    /// Every traversable arc as `(from, to, weight)`, in edge order; an
    /// undirected edge yields its forward then backward arc.
    pub fn arcs(&self) -> Vec<(usize, usize, f64)> {
        let mut out = Vec::with_capacity(self.edges.len() * 2);
        for (i, edge) in self.edges.iter().enumerate() {
            let Some((u, v)) = self.endpoints(i) else {
                continue;
            };
            out.push((u, v, edge.weight));
            if !self.directed && u != v {
                out.push((v, u, edge.weight));
            }
        }
        out
    }
}

/// A graph plus the node a search starts from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootedGraph {
    /// The graph.
    pub graph: Graph,
    /// Start node name.
    pub source: String,
}

impl RootedGraph {
    /// Pair a graph with its source node.
    pub fn new(graph: Graph, source: impl Into<String>) -> Self {
        Self {
            graph,
            source: source.into(),
        }
    }

    /// Validate the graph and resolve the source node.
    pub fn validate(&self) -> Result<usize, ParamError> {
        self.graph.validate()?;
        self.graph.require_node("source", &self.source)
    }
}
