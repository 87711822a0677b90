//! Prim's minimum spanning tree grown from a single source.

use serde::Serialize;
use stepwise_core::{Complexity, Conclusion, Engine, Outcome, ParamError, Recorder};

use super::kruskal::require_undirected;
use super::{Arc, Edge, Graph, RootedGraph, SpanningTree};

/// Prim's algorithm.
///
/// The frontier holds every edge leaving the tree at the time its near
/// endpoint joined. Each round takes the lightest frontier edge (lowest
/// edge index on ties) and rejects it if its far endpoint has since
/// joined the tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Prim;

#[derive(Clone, Copy)]
struct Boundary {
    from: usize,
    arc: Arc,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrimSnapshot {
    in_tree: Vec<String>,
    frontier: Vec<Edge>,
    accepted: Vec<Edge>,
    candidate: Option<Edge>,
}

fn as_edge(graph: &Graph, b: &Boundary) -> Edge {
    Edge {
        from: graph.nodes[b.from].clone(),
        to: graph.nodes[b.arc.to].clone(),
        weight: b.arc.weight,
    }
}

fn snapshot(
    graph: &Graph,
    tree_order: &[usize],
    frontier: &[Boundary],
    accepted: &[Edge],
    candidate: Option<&Boundary>,
) -> PrimSnapshot {
    PrimSnapshot {
        in_tree: super::names(graph, tree_order),
        frontier: frontier.iter().map(|b| as_edge(graph, b)).collect(),
        accepted: accepted.to_vec(),
        candidate: candidate.map(|b| as_edge(graph, b)),
    }
}

impl Engine for Prim {
    type Problem = RootedGraph;

    fn name(&self) -> &str {
        "prim"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(V E) with a linear frontier scan", "O(E)")
    }

    fn validate(&self, problem: &RootedGraph) -> Result<(), ParamError> {
        require_undirected(&problem.graph)?;
        problem.validate().map(|_| ())
    }

    fn run(&self, problem: &RootedGraph, rec: &mut Recorder) -> Conclusion {
        let graph = &problem.graph;
        let n = graph.node_count();
        let adj = graph.adjacency();
        let source = graph.index_of(&problem.source).unwrap_or(0);
        let mut in_tree = vec![false; n];
        let mut tree_order = vec![source];
        let mut frontier: Vec<Boundary> = Vec::new();
        let mut accepted: Vec<Edge> = Vec::new();
        let mut total = 0.0;

        in_tree[source] = true;
        frontier.extend(
            adj[source]
                .iter()
                .filter(|a| !in_tree[a.to])
                .map(|&arc| Boundary { from: source, arc }),
        );
        rec.record(
            format!(
                "Start the tree at {}; {} boundary edge(s) enter the frontier",
                problem.source,
                frontier.len()
            ),
            &snapshot(graph, &tree_order, &frontier, &accepted, None),
        )
        .metric("treeSize", 1)
        .note("The lightest edge crossing the cut between tree and non-tree nodes is always safe");

        while tree_order.len() < n {
            let mut best: Option<usize> = None;
            for (pos, b) in frontier.iter().enumerate() {
                best = match best {
                    Some(i) => {
                        let cur = &frontier[i];
                        let lighter = b.arc.weight < cur.arc.weight
                            || (b.arc.weight == cur.arc.weight && b.arc.edge < cur.arc.edge);
                        Some(if lighter { pos } else { i })
                    }
                    None => Some(pos),
                };
            }
            let Some(pos) = best else {
                rec.record(
                    format!(
                        "Frontier empty with {} of {n} node(s) in the tree: graph is disconnected",
                        tree_order.len()
                    ),
                    &snapshot(graph, &tree_order, &frontier, &accepted, None),
                )
                .metric("treeSize", tree_order.len());
                let tree = SpanningTree {
                    edges: accepted,
                    total_weight: total,
                    spanning: false,
                };
                return Conclusion::new(Outcome::no_solution("graph is disconnected"), &tree);
            };
            let candidate = frontier.remove(pos);
            let edge = as_edge(graph, &candidate);
            if in_tree[candidate.arc.to] {
                rec.record(
                    format!(
                        "Reject {} - {} ({}): {} is already in the tree",
                        edge.from, edge.to, edge.weight, edge.to
                    ),
                    &snapshot(graph, &tree_order, &frontier, &accepted, Some(&candidate)),
                )
                .metric("totalWeight", total);
                continue;
            }

            let v = candidate.arc.to;
            in_tree[v] = true;
            tree_order.push(v);
            total += edge.weight;
            accepted.push(edge.clone());
            frontier.extend(
                adj[v]
                    .iter()
                    .filter(|a| !in_tree[a.to])
                    .map(|&arc| Boundary { from: v, arc }),
            );
            rec.record(
                format!(
                    "Accept {} - {} ({}): add {} to the tree",
                    edge.from, edge.to, edge.weight, edge.to
                ),
                &snapshot(graph, &tree_order, &frontier, &accepted, Some(&candidate)),
            )
            .metric("totalWeight", total)
            .metric("treeSize", tree_order.len());
        }

        rec.record(
            format!("Spanning tree complete: weight {total}"),
            &snapshot(graph, &tree_order, &frontier, &accepted, None),
        )
        .metric("totalWeight", total);
        Conclusion::solved(&SpanningTree {
            edges: accepted,
            total_weight: total,
            spanning: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> Graph {
        Graph::undirected(&["A", "B", "C", "D"])
            .with_edge("A", "B", 2.0)
            .with_edge("A", "C", 3.0)
            .with_edge("B", "C", 1.0)
            .with_edge("C", "D", 4.0)
            .with_edge("B", "D", 5.0)
    }

    #[test]
    fn grows_minimum_tree() {
        let sim = Prim.simulate(&RootedGraph::new(graph(), "A"));
        assert!(sim.success);
        let tree: SpanningTree = serde_json::from_value(sim.result).unwrap();
        assert_eq!(tree.total_weight, 7.0);
        let order: Vec<&str> = tree.edges.iter().map(|e| e.to.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "D"]);
    }

    #[test]
    fn stale_frontier_edge_is_rejected() {
        let sim = Prim.simulate(&RootedGraph::new(graph(), "A"));
        assert!(sim
            .steps
            .iter()
            .any(|s| s.description.starts_with("Reject A - C")));
    }

    #[test]
    fn disconnected_is_no_solution() {
        let g = Graph::undirected(&["A", "B", "C"]).with_edge("A", "B", 1.0);
        let sim = Prim.simulate(&RootedGraph::new(g, "A"));
        assert!(matches!(sim.outcome, Outcome::NoSolution { .. }));
        assert!(sim.last_step().unwrap().description.contains("disconnected"));
    }

    #[test]
    fn agrees_with_kruskal_on_weight() {
        use crate::graph::Kruskal;
        let k = Kruskal.simulate(&graph());
        let p = Prim.simulate(&RootedGraph::new(graph(), "D"));
        assert_eq!(k.result["totalWeight"], p.result["totalWeight"]);
    }
}
