//! Bellman-Ford shortest paths with negative-cycle detection.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, Outcome, ParamError, Recorder};

use super::{name_of, named, show, DistanceSnapshot, RootedGraph};

/// Bellman-Ford.
///
/// Runs at most |V| − 1 relaxation passes over every arc in edge order,
/// stopping early after a pass that changes nothing, then one more pass
/// whose only job is to detect a negative cycle reachable from the
/// source. A detected cycle ends the run without distances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BellmanFord;

/// Outcome of a Bellman-Ford run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BellmanFordResult {
    /// `true` when a reachable negative cycle exists.
    pub negative_cycle: bool,
    /// Final distances; absent when a negative cycle was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distances: Option<IndexMap<String, Option<f64>>>,
    /// Predecessors; absent when a negative cycle was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<IndexMap<String, Option<String>>>,
    /// Relaxation passes performed, not counting the detection pass.
    pub passes: u64,
}

impl Engine for BellmanFord {
    type Problem = RootedGraph;

    fn name(&self) -> &str {
        "bellman-ford"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(V E)", "O(V)")
    }

    fn validate(&self, problem: &RootedGraph) -> Result<(), ParamError> {
        problem.validate().map(|_| ())
    }

    fn run(&self, problem: &RootedGraph, rec: &mut Recorder) -> Conclusion {
        let graph = &problem.graph;
        let n = graph.node_count();
        let arcs = graph.arcs();
        let source = graph.index_of(&problem.source).unwrap_or(0);
        let mut dist: Vec<Option<f64>> = vec![None; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        dist[source] = Some(0.0);

        rec.record(
            format!(
                "Initialize: d({}) = 0, others ∞; up to {} pass(es) over {} arc(s)",
                problem.source,
                n.saturating_sub(1),
                arcs.len()
            ),
            &DistanceSnapshot::capture(graph, None, &dist, &prev, &[]),
        )
        .note("A shortest simple path has at most |V| - 1 edges, so |V| - 1 passes suffice");

        let mut passes = 0u64;
        for pass in 1..n {
            passes = pass as u64;
            let mut updates = 0usize;
            for &(u, v, w) in &arcs {
                let Some(du) = dist[u] else { continue };
                let candidate = du + w;
                let old = dist[v];
                if old.is_none_or(|d| candidate < d) {
                    dist[v] = Some(candidate);
                    prev[v] = Some(u);
                    updates += 1;
                    rec.record(
                        format!(
                            "Pass {pass}: relax {} -> {}: {du} + {w} = {candidate} < {}, update",
                            graph.nodes[u],
                            graph.nodes[v],
                            show(old)
                        ),
                        &DistanceSnapshot::capture(graph, Some(v), &dist, &prev, &[]),
                    )
                    .metric("pass", pass)
                    .metric("improved", true);
                } else {
                    rec.record(
                        format!(
                            "Pass {pass}: relax {} -> {}: {candidate} does not improve {}",
                            graph.nodes[u],
                            graph.nodes[v],
                            show(old)
                        ),
                        &DistanceSnapshot::capture(graph, Some(v), &dist, &prev, &[]),
                    )
                    .metric("pass", pass)
                    .metric("improved", false);
                }
            }
            let step = rec
                .record(
                    format!("Pass {pass} complete: {updates} update(s)"),
                    &DistanceSnapshot::capture(graph, None, &dist, &prev, &[]),
                )
                .metric("pass", pass)
                .metric("updates", updates);
            if updates == 0 {
                step.note("Nothing changed, so later passes cannot change anything either");
                break;
            }
        }

        for &(u, v, w) in &arcs {
            let Some(du) = dist[u] else { continue };
            let Some(dv) = dist[v] else { continue };
            if du + w < dv {
                rec.record(
                    format!(
                        "Detection pass: {} -> {} still relaxes ({du} + {w} < {dv}): negative cycle",
                        graph.nodes[u], graph.nodes[v]
                    ),
                    &DistanceSnapshot::capture(graph, Some(v), &dist, &prev, &[]),
                )
                .metric("negativeCycle", true)
                .note("After |V| - 1 passes any further improvement must come from a cycle of negative total weight");
                return Conclusion::new(
                    Outcome::no_solution("negative cycle reachable from source"),
                    &BellmanFordResult {
                        negative_cycle: true,
                        distances: None,
                        previous: None,
                        passes,
                    },
                );
            }
        }

        rec.record(
            "Detection pass: no arc can be relaxed, no negative cycle",
            &DistanceSnapshot::capture(graph, None, &dist, &prev, &[]),
        )
        .metric("negativeCycle", false)
        .metric("passes", passes);

        let previous: Vec<Option<String>> = prev.iter().map(|&p| name_of(graph, p)).collect();
        Conclusion::solved(&BellmanFordResult {
            negative_cycle: false,
            distances: Some(named(graph, &dist)),
            previous: Some(named(graph, &previous)),
            passes,
        })
    }
}
