//! Trace comparison and replay verification.
//!
//! Hash-first comparison (fast path) with a step-by-step field
//! comparison on mismatch, plus a driver that re-runs an engine and
//! compares the fresh trace against a recorded one.

use serde::{Deserialize, Serialize};
use stepwise_core::{Engine, Simulation, Step, StepId};

use crate::hash::{step_hash, trace_hash};

/// What differs between a recorded and a replayed trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DivergenceKind {
    /// Step narration differs.
    Description,
    /// Step state snapshot differs.
    State,
    /// Step metrics differ.
    Metrics,
    /// Step notes differ.
    Notes,
    /// The traces have different lengths.
    StepCount {
        /// Steps in the recorded trace.
        recorded: usize,
        /// Steps in the replayed trace.
        replayed: usize,
    },
    /// The outcomes differ.
    Outcome,
    /// The final results differ.
    Result,
}

/// The first point where two traces disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceReport {
    /// First diverging step; `None` when every step matches and only the
    /// outcome or result differs.
    pub step: Option<StepId>,
    /// Every difference found at that point.
    pub kinds: Vec<DivergenceKind>,
}

fn step_fields(recorded: &Step, replayed: &Step) -> Vec<DivergenceKind> {
    let mut kinds = Vec::new();
    if recorded.description != replayed.description {
        kinds.push(DivergenceKind::Description);
    }
    if recorded.state != replayed.state {
        kinds.push(DivergenceKind::State);
    }
    if recorded.metrics != replayed.metrics {
        kinds.push(DivergenceKind::Metrics);
    }
    if recorded.educational_notes != replayed.educational_notes {
        kinds.push(DivergenceKind::Notes);
    }
    kinds
}

/// Compare two traces.
///
/// Returns `None` when they hash equal. Otherwise reports the first
/// step whose hash differs together with the fields that differ there.
/// A length difference is always reported, since it means one trace
/// continued where the other stopped.
pub fn compare(recorded: &Simulation, replayed: &Simulation) -> Option<DivergenceReport> {
    if trace_hash(recorded) == trace_hash(replayed) {
        return None;
    }
    let mut kinds = Vec::new();
    let mut step = None;
    let first = recorded
        .steps
        .iter()
        .zip(&replayed.steps)
        .find(|(a, b)| step_hash(a) != step_hash(b));
    if let Some((a, b)) = first {
        step = Some(a.id);
        kinds = step_fields(a, b);
    }
    let (n, m) = (recorded.steps.len(), replayed.steps.len());
    if n != m {
        if step.is_none() {
            step = Some(StepId::from(n.min(m)));
        }
        kinds.push(DivergenceKind::StepCount {
            recorded: n,
            replayed: m,
        });
    }
    if step.is_none() {
        if recorded.outcome != replayed.outcome {
            kinds.push(DivergenceKind::Outcome);
        }
        if recorded.result != replayed.result {
            kinds.push(DivergenceKind::Result);
        }
    }
    tracing::debug!(?step, ?kinds, "traces diverge");
    Some(DivergenceReport { step, kinds })
}

/// Re-run `engine` on `problem` and compare with a recorded trace.
///
/// Randomized engines must be configured with the seed stored in
/// `recorded.metadata.seed` for the comparison to be meaningful.
pub fn replay_and_compare<E: Engine + ?Sized>(
    engine: &E,
    problem: &E::Problem,
    recorded: &Simulation,
) -> Option<DivergenceReport> {
    let replayed = engine.simulate(problem);
    compare(recorded, &replayed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stepwise_core::{Complexity, Outcome, Recorder};

    fn trace(values: &[i64], result: i64) -> Simulation {
        let mut rec = Recorder::new("t");
        for v in values {
            rec.record(format!("value {v}"), v);
        }
        rec.finish(
            Outcome::Solved,
            json!(result),
            Complexity::default(),
            0,
            None,
        )
    }

    #[test]
    fn identical_traces_match() {
        assert!(compare(&trace(&[1, 2], 3), &trace(&[1, 2], 3)).is_none());
    }

    #[test]
    fn first_diverging_step_is_reported() {
        let report = compare(&trace(&[1, 2, 3], 6), &trace(&[1, 9, 3], 6)).unwrap();
        assert_eq!(report.step, Some(StepId(1)));
        assert_eq!(
            report.kinds,
            vec![DivergenceKind::Description, DivergenceKind::State]
        );
    }

    #[test]
    fn notes_only_divergence() {
        let a = trace(&[1], 1);
        let mut b = a.clone();
        b.steps[0].educational_notes.push("why".into());
        let report = compare(&a, &b).unwrap();
        assert_eq!(report.kinds, vec![DivergenceKind::Notes]);
    }

    #[test]
    fn truncated_trace_reports_length() {
        let report = compare(&trace(&[1, 2, 3], 6), &trace(&[1, 2], 6)).unwrap();
        assert_eq!(report.step, Some(StepId(2)));
        assert_eq!(
            report.kinds,
            vec![DivergenceKind::StepCount {
                recorded: 3,
                replayed: 2
            }]
        );
    }

    #[test]
    fn result_only_divergence() {
        let report = compare(&trace(&[1, 2], 3), &trace(&[1, 2], 4)).unwrap();
        assert_eq!(report.step, None);
        assert_eq!(report.kinds, vec![DivergenceKind::Result]);
    }
}
