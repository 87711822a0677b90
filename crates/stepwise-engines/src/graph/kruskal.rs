//! Kruskal's minimum spanning tree with a union-find forest.

use serde::Serialize;
use stepwise_core::{Complexity, Conclusion, Engine, Outcome, ParamError, Recorder};

use super::{Edge, Graph, SpanningTree};

/// Disjoint-set forest with path compression and union by rank.
#[derive(Clone, Debug)]
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cursor = x;
        while self.parent[cursor] != root {
            let next = self.parent[cursor];
            self.parent[cursor] = root;
            cursor = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`; `false` if already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }

    /// Members of every set, sets ordered by their smallest member.
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let n = self.parent.len();
        let mut slot: Vec<Option<usize>> = vec![None; n];
        let mut out: Vec<Vec<usize>> = Vec::new();
        for x in 0..n {
            let root = self.find(x);
            match slot[root] {
                Some(i) => out[i].push(x),
                None => {
                    slot[root] = Some(out.len());
                    out.push(vec![x]);
                }
            }
        }
        out
    }
}

/// Kruskal's algorithm.
///
/// Edges are sorted by weight with a stable sort, so equal weights keep
/// their input order. Requires an undirected graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Kruskal;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KruskalSnapshot {
    sorted_edges: Vec<Edge>,
    considered: Option<usize>,
    accepted: Vec<Edge>,
    components: Vec<Vec<String>>,
}

fn snapshot(
    graph: &Graph,
    sorted: &[Edge],
    considered: Option<usize>,
    accepted: &[Edge],
    sets: &mut DisjointSet,
) -> KruskalSnapshot {
    KruskalSnapshot {
        sorted_edges: sorted.to_vec(),
        considered,
        accepted: accepted.to_vec(),
        components: sets
            .groups()
            .into_iter()
            .map(|g| super::names(graph, &g))
            .collect(),
    }
}

pub(crate) fn require_undirected(graph: &Graph) -> Result<(), ParamError> {
    graph.validate()?;
    if graph.directed {
        return Err(ParamError::inconsistent(
            "a minimum spanning tree needs an undirected graph",
        ));
    }
    Ok(())
}

impl Engine for Kruskal {
    type Problem = Graph;

    fn name(&self) -> &str {
        "kruskal"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(E log E)", "O(V + E)")
    }

    fn validate(&self, graph: &Graph) -> Result<(), ParamError> {
        require_undirected(graph)
    }

    fn run(&self, graph: &Graph, rec: &mut Recorder) -> Conclusion {
        let n = graph.node_count();
        let mut order: Vec<usize> = (0..graph.edges.len()).collect();
        order.sort_by(|&a, &b| graph.edges[a].weight.total_cmp(&graph.edges[b].weight));
        let sorted: Vec<Edge> = order.iter().map(|&i| graph.edges[i].clone()).collect();
        let mut sets = DisjointSet::new(n);
        let mut accepted: Vec<Edge> = Vec::new();
        let mut total = 0.0;
        let needed = n.saturating_sub(1);

        rec.record(
            format!("Sort {} edge(s) by weight; every node starts in its own set", sorted.len()),
            &snapshot(graph, &sorted, None, &accepted, &mut sets),
        )
        .metric("needed", needed)
        .note("An edge is safe to add when its endpoints lie in different components");

        for (pos, &edge_idx) in order.iter().enumerate() {
            if accepted.len() == needed {
                break;
            }
            let edge = &graph.edges[edge_idx];
            let Some((u, v)) = graph.endpoints(edge_idx) else {
                continue;
            };
            if sets.union(u, v) {
                accepted.push(edge.clone());
                total += edge.weight;
                rec.record(
                    format!(
                        "Accept {} - {} ({}): joins two components",
                        edge.from, edge.to, edge.weight
                    ),
                    &snapshot(graph, &sorted, Some(pos), &accepted, &mut sets),
                )
                .metric("totalWeight", total)
                .metric("accepted", accepted.len());
            } else {
                rec.record(
                    format!(
                        "Reject {} - {} ({}): would close a cycle",
                        edge.from, edge.to, edge.weight
                    ),
                    &snapshot(graph, &sorted, Some(pos), &accepted, &mut sets),
                )
                .metric("totalWeight", total)
                .metric("accepted", accepted.len());
            }
        }

        let spanning = accepted.len() == needed;
        let components = sets.groups().len();
        let tree = SpanningTree {
            edges: accepted,
            total_weight: total,
            spanning,
        };
        if spanning {
            rec.record(
                format!("Spanning tree complete: {} edge(s), weight {total}", tree.edges.len()),
                &snapshot(graph, &sorted, None, &tree.edges, &mut sets),
            )
            .metric("totalWeight", total);
            Conclusion::solved(&tree)
        } else {
            rec.record(
                format!("Edges exhausted: graph is disconnected into {components} components"),
                &snapshot(graph, &sorted, None, &tree.edges, &mut sets),
            )
            .metric("components", components)
            .note("The accepted edges form a minimum spanning forest instead");
            Conclusion::new(Outcome::no_solution("graph is disconnected"), &tree)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Graph {
        Graph::undirected(&["A", "B", "C", "D"])
            .with_edge("A", "B", 1.0)
            .with_edge("B", "C", 2.0)
            .with_edge("C", "D", 1.0)
            .with_edge("D", "A", 3.0)
            .with_edge("A", "C", 2.0)
    }

    #[test]
    fn minimum_weight_tree() {
        let sim = Kruskal.simulate(&square());
        assert!(sim.success);
        let tree: SpanningTree = serde_json::from_value(sim.result).unwrap();
        assert_eq!(tree.total_weight, 4.0);
        assert_eq!(tree.edges.len(), 3);
        // B-C precedes A-C among the weight-2 edges.
        assert_eq!(tree.edges[2].from, "B");
    }

    #[test]
    fn cycle_edge_rejected_step() {
        let sim = Kruskal.simulate(&square());
        assert!(sim
            .steps
            .iter()
            .all(|s| !s.description.starts_with("Reject A - C")));
        let g = Graph::undirected(&["A", "B", "C"])
            .with_edge("A", "B", 1.0)
            .with_edge("B", "C", 1.0)
            .with_edge("A", "C", 1.0)
            .with_edge("A", "A", 0.5);
        let sim = Kruskal.simulate(&g);
        assert!(sim.steps[1].description.starts_with("Reject A - A"));
    }

    #[test]
    fn disconnected_graph_yields_forest() {
        let g = Graph::undirected(&["A", "B", "C", "D"])
            .with_edge("A", "B", 1.0)
            .with_edge("C", "D", 2.0);
        let sim = Kruskal.simulate(&g);
        assert!(matches!(sim.outcome, Outcome::NoSolution { .. }));
        assert_eq!(sim.result["spanning"], false);
        assert_eq!(sim.result["edges"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn directed_graph_rejected() {
        let sim = Kruskal.simulate(&Graph::directed(&["A"]));
        assert!(sim.steps.is_empty());
    }

    #[test]
    fn disjoint_set_groups() {
        let mut s = DisjointSet::new(5);
        assert!(s.union(3, 1));
        assert!(s.union(0, 4));
        assert!(!s.union(1, 3));
        assert_eq!(s.groups(), vec![vec![0, 4], vec![1, 3], vec![2]]);
    }
}
