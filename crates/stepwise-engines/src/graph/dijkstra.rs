//! Dijkstra's single-source shortest paths with an O(V²) selection scan.

use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};

use super::{name_of, named, names, show, DistanceSnapshot, RootedGraph, ShortestPaths};

/// Dijkstra's algorithm.
///
/// Each round finalizes the unfinished node with the smallest tentative
/// distance (lowest node index on ties) and relaxes its outgoing arcs in
/// edge order. Negative weights are rejected at the boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dijkstra;

impl Engine for Dijkstra {
    type Problem = RootedGraph;

    fn name(&self) -> &str {
        "dijkstra"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(V^2 + E)", "O(V)")
    }

    fn validate(&self, problem: &RootedGraph) -> Result<(), ParamError> {
        problem.validate()?;
        if let Some(edge) = problem.graph.edges.iter().find(|e| e.weight < 0.0) {
            return Err(ParamError::out_of_range(
                "weight",
                edge.weight,
                format!(">= 0 (edge {} -> {})", edge.from, edge.to),
            ));
        }
        Ok(())
    }

    fn run(&self, problem: &RootedGraph, rec: &mut Recorder) -> Conclusion {
        let graph = &problem.graph;
        let n = graph.node_count();
        let adj = graph.adjacency();
        let mut dist: Vec<Option<f64>> = vec![None; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut done = vec![false; n];
        let mut order: Vec<usize> = Vec::new();
        let source = graph.index_of(&problem.source).unwrap_or(0);
        dist[source] = Some(0.0);

        rec.record(
            format!("Initialize: d({}) = 0, every other distance = ∞", problem.source),
            &DistanceSnapshot::capture(graph, None, &dist, &prev, &order),
        )
        .metric("nodes", n)
        .metric("edges", graph.edges.len())
        .note("Once a node is selected its distance is final, because no edge weight is negative");

        loop {
            let mut selected: Option<(usize, f64)> = None;
            for u in 0..n {
                if done[u] {
                    continue;
                }
                if let Some(d) = dist[u] {
                    if selected.is_none_or(|(_, best)| d < best) {
                        selected = Some((u, d));
                    }
                }
            }
            let Some((u, du)) = selected else { break };
            done[u] = true;
            order.push(u);
            rec.record(
                format!("Select {} with smallest tentative distance {du}", graph.nodes[u]),
                &DistanceSnapshot::capture(graph, Some(u), &dist, &prev, &order),
            )
            .metric("distance", du)
            .metric("finalized", order.len());

            for arc in &adj[u] {
                if done[arc.to] {
                    continue;
                }
                let candidate = du + arc.weight;
                let (from, to) = (&graph.nodes[u], &graph.nodes[arc.to]);
                let old = dist[arc.to];
                if old.is_none_or(|d| candidate < d) {
                    dist[arc.to] = Some(candidate);
                    prev[arc.to] = Some(u);
                    rec.record(
                        format!(
                            "Relax {from} -> {to}: {du} + {} = {candidate} < {}, update",
                            arc.weight,
                            show(old)
                        ),
                        &DistanceSnapshot::capture(graph, Some(u), &dist, &prev, &order),
                    )
                    .metric("candidate", candidate)
                    .metric("improved", true);
                } else {
                    rec.record(
                        format!(
                            "Relax {from} -> {to}: {du} + {} = {candidate} is not better than {}",
                            arc.weight,
                            show(old)
                        ),
                        &DistanceSnapshot::capture(graph, Some(u), &dist, &prev, &order),
                    )
                    .metric("candidate", candidate)
                    .metric("improved", false);
                }
            }
        }

        let unreachable: Vec<usize> = (0..n).filter(|&i| dist[i].is_none()).collect();
        let step = rec
            .record(
                format!(
                    "Done: {} node(s) reached, {} unreachable",
                    order.len(),
                    unreachable.len()
                ),
                &DistanceSnapshot::capture(graph, None, &dist, &prev, &order),
            )
            .metric("reached", order.len());
        if !unreachable.is_empty() {
            step.note(format!(
                "No path leads to {}",
                names(graph, &unreachable).join(", ")
            ));
        }

        let previous: Vec<Option<String>> = prev.iter().map(|&p| name_of(graph, p)).collect();
        Conclusion::solved(&ShortestPaths {
            distances: named(graph, &dist),
            previous: named(graph, &previous),
            order: names(graph, &order),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use stepwise_core::Outcome;

    fn sample() -> RootedGraph {
        let g = Graph::directed(&["A", "B", "C", "D", "E"])
            .with_edge("A", "B", 4.0)
            .with_edge("A", "C", 1.0)
            .with_edge("C", "B", 2.0)
            .with_edge("B", "D", 1.0)
            .with_edge("C", "D", 5.0);
        RootedGraph::new(g, "A")
    }

    #[test]
    fn shortest_distances() {
        let sim = Dijkstra.simulate(&sample());
        assert!(sim.success);
        let r: ShortestPaths = serde_json::from_value(sim.result).unwrap();
        assert_eq!(r.distances["A"], Some(0.0));
        assert_eq!(r.distances["B"], Some(3.0));
        assert_eq!(r.distances["C"], Some(1.0));
        assert_eq!(r.distances["D"], Some(4.0));
        assert_eq!(r.distances["E"], None);
        assert_eq!(r.previous["B"].as_deref(), Some("C"));
        assert_eq!(r.order, vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn ties_go_to_lower_node_index() {
        let g = Graph::undirected(&["S", "X", "Y"])
            .with_edge("S", "Y", 1.0)
            .with_edge("S", "X", 1.0);
        let sim = Dijkstra.simulate(&RootedGraph::new(g, "S"));
        assert_eq!(sim.result["order"], serde_json::json!(["S", "X", "Y"]));
    }

    #[test]
    fn negative_weight_rejected() {
        let g = Graph::directed(&["A", "B"]).with_edge("A", "B", -1.0);
        let sim = Dijkstra.simulate(&RootedGraph::new(g, "A"));
        assert!(sim.steps.is_empty());
        assert!(matches!(sim.outcome, Outcome::InvalidParameter { .. }));
    }

    #[test]
    fn unknown_source_rejected() {
        let sim = Dijkstra.simulate(&RootedGraph::new(Graph::undirected(&["A"]), "Z"));
        assert!(sim.steps.is_empty());
    }

    #[test]
    fn unreachable_nodes_noted_on_final_step() {
        let sim = Dijkstra.simulate(&sample());
        let last = sim.last_step().unwrap();
        assert!(last.description.contains("1 unreachable"));
        assert!(last.educational_notes[0].contains('E'));
    }
}
