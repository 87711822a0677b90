//! Breadth-first and depth-first traversal with a depth cap.

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, Limits, Outcome, ParamError, Recorder};

use super::{name_of, named, names, Graph, RootedGraph};

/// Which frontier discipline to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraversalOrder {
    /// FIFO queue; nodes are marked when discovered.
    #[default]
    BreadthFirst,
    /// Explicit LIFO stack; nodes are marked when popped.
    DepthFirst,
}

/// Graph traversal engine.
///
/// Depth-first search pushes neighbours in reverse edge order so they are
/// popped in edge order, which reproduces the visiting order of the
/// recursive formulation. Nodes deeper than `max_depth` are not entered;
/// if any node is left unvisited because of that, the run ends
/// [`Outcome::Bounded`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Traversal {
    /// Frontier discipline.
    pub order: TraversalOrder,
    /// Deepest level entered. Default: [`Limits::max_depth`].
    pub max_depth: u64,
}

impl Default for Traversal {
    fn default() -> Self {
        Self::bfs()
    }
}

impl Traversal {
    /// Breadth-first traversal with the default depth cap.
    pub fn bfs() -> Self {
        Self {
            order: TraversalOrder::BreadthFirst,
            max_depth: Limits::default().max_depth,
        }
    }

    /// Depth-first traversal with the default depth cap.
    pub fn dfs() -> Self {
        Self {
            order: TraversalOrder::DepthFirst,
            ..Self::bfs()
        }
    }

    /// Replace the depth cap.
    pub fn with_max_depth(mut self, max_depth: u64) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Visiting order and the traversal tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalResult {
    /// Nodes in visiting order.
    pub order: Vec<String>,
    /// Tree parent per node; `None` for the source and unvisited nodes.
    pub parents: IndexMap<String, Option<String>>,
    /// Tree depth per node; `None` for unvisited nodes.
    pub depths: IndexMap<String, Option<u64>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TraversalSnapshot {
    current: Option<String>,
    frontier: Vec<String>,
    visited: Vec<String>,
}

struct Walk<'a> {
    graph: &'a Graph,
    visited: Vec<bool>,
    parent: Vec<Option<usize>>,
    depth: Vec<Option<u64>>,
    order: Vec<usize>,
    cut: Vec<usize>,
}

impl<'a> Walk<'a> {
    fn new(graph: &'a Graph) -> Self {
        let n = graph.node_count();
        Self {
            graph,
            visited: vec![false; n],
            parent: vec![None; n],
            depth: vec![None; n],
            order: Vec::new(),
            cut: Vec::new(),
        }
    }

    fn snapshot(&self, current: Option<usize>, frontier: &[usize]) -> TraversalSnapshot {
        TraversalSnapshot {
            current: name_of(self.graph, current),
            frontier: names(self.graph, frontier),
            visited: names(self.graph, &self.order),
        }
    }

    fn result(&self) -> TraversalResult {
        let parents: Vec<Option<String>> =
            self.parent.iter().map(|&p| name_of(self.graph, p)).collect();
        TraversalResult {
            order: names(self.graph, &self.order),
            parents: named(self.graph, &parents),
            depths: named(self.graph, &self.depth),
        }
    }

    fn truncated(&self) -> bool {
        self.cut.iter().any(|&v| !self.visited[v])
    }
}

impl Traversal {
    fn breadth_first(&self, source: usize, walk: &mut Walk<'_>, rec: &mut Recorder) {
        let graph = walk.graph;
        let adj = graph.adjacency();
        let mut queue: VecDeque<usize> = VecDeque::from([source]);
        walk.visited[source] = true;
        walk.depth[source] = Some(0);
        rec.record(
            format!("Enqueue source {}", graph.nodes[source]),
            &walk.snapshot(None, &[source]),
        )
        .note("BFS visits nodes in order of their hop distance from the source");

        while let Some(u) = queue.pop_front() {
            walk.order.push(u);
            let du = walk.depth[u].unwrap_or(0);
            let frontier: Vec<usize> = queue.iter().copied().collect();
            rec.record(
                format!("Dequeue {} (depth {du})", graph.nodes[u]),
                &walk.snapshot(Some(u), &frontier),
            )
            .metric("depth", du)
            .metric("queueSize", queue.len());
            for arc in &adj[u] {
                let v = arc.to;
                if walk.visited[v] {
                    continue;
                }
                if du + 1 > self.max_depth {
                    walk.cut.push(v);
                    continue;
                }
                walk.visited[v] = true;
                walk.parent[v] = Some(u);
                walk.depth[v] = Some(du + 1);
                queue.push_back(v);
                let frontier: Vec<usize> = queue.iter().copied().collect();
                rec.record(
                    format!(
                        "Discover {} from {}, enqueue at depth {}",
                        graph.nodes[v],
                        graph.nodes[u],
                        du + 1
                    ),
                    &walk.snapshot(Some(u), &frontier),
                )
                .metric("queueSize", queue.len());
            }
        }
    }

    fn depth_first(&self, source: usize, walk: &mut Walk<'_>, rec: &mut Recorder) {
        let graph = walk.graph;
        let adj = graph.adjacency();
        let mut stack: Vec<(usize, Option<usize>, u64)> = vec![(source, None, 0)];
        rec.record(
            format!("Push source {}", graph.nodes[source]),
            &walk.snapshot(None, &[source]),
        )
        .note("Neighbours are pushed in reverse so the first edge is explored first");

        while let Some((u, parent, du)) = stack.pop() {
            if walk.visited[u] {
                let frontier: Vec<usize> = stack.iter().map(|e| e.0).collect();
                rec.record(
                    format!("Pop {}: already visited, skip", graph.nodes[u]),
                    &walk.snapshot(None, &frontier),
                )
                .metric("stackSize", stack.len());
                continue;
            }
            walk.visited[u] = true;
            walk.parent[u] = parent;
            walk.depth[u] = Some(du);
            walk.order.push(u);
            for arc in adj[u].iter().rev() {
                if walk.visited[arc.to] {
                    continue;
                }
                if du + 1 > self.max_depth {
                    walk.cut.push(arc.to);
                    continue;
                }
                stack.push((arc.to, Some(u), du + 1));
            }
            let frontier: Vec<usize> = stack.iter().map(|e| e.0).collect();
            rec.record(
                format!("Visit {} (depth {du})", graph.nodes[u]),
                &walk.snapshot(Some(u), &frontier),
            )
            .metric("depth", du)
            .metric("stackSize", stack.len());
        }
    }
}

impl Engine for Traversal {
    type Problem = RootedGraph;

    fn name(&self) -> &str {
        match self.order {
            TraversalOrder::BreadthFirst => "bfs",
            TraversalOrder::DepthFirst => "dfs",
        }
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(V + E)", "O(V)")
    }

    fn validate(&self, problem: &RootedGraph) -> Result<(), ParamError> {
        if self.max_depth == 0 {
            return Err(ParamError::out_of_range("max_depth", 0, ">= 1"));
        }
        problem.validate().map(|_| ())
    }

    fn run(&self, problem: &RootedGraph, rec: &mut Recorder) -> Conclusion {
        let graph = &problem.graph;
        let source = graph.index_of(&problem.source).unwrap_or(0);
        let mut walk = Walk::new(graph);
        match self.order {
            TraversalOrder::BreadthFirst => self.breadth_first(source, &mut walk, rec),
            TraversalOrder::DepthFirst => self.depth_first(source, &mut walk, rec),
        }

        let result = walk.result();
        if walk.truncated() {
            let mut missed: Vec<usize> = walk
                .cut
                .iter()
                .copied()
                .filter(|&v| !walk.visited[v])
                .collect();
            missed.sort_unstable();
            missed.dedup();
            rec.record(
                format!(
                    "Depth limit {} reached: {} not entered",
                    self.max_depth,
                    names(graph, &missed).join(", ")
                ),
                &walk.snapshot(None, &[]),
            )
            .metric("visited", walk.order.len());
            return Conclusion::new(Outcome::bounded("max_depth", self.max_depth), &result);
        }
        rec.record(
            format!("Traversal complete: {} node(s) visited", walk.order.len()),
            &walk.snapshot(None, &[]),
        )
        .metric("visited", walk.order.len());
        Conclusion::solved(&result)
    }
}
