//! The [`Recorder`]: append-only capture of [`Step`]s during a run.

use serde::Serialize;
use serde_json::Value;

use crate::id::StepId;
use crate::trace::{Metadata, Metrics, Outcome, Simulation, Step};
use crate::Complexity;

/// Collects steps in order while an engine runs.
///
/// [`record`](Recorder::record) serializes the given state immediately,
/// so the stored value is independent of the engine's working memory.
/// The returned `&mut Step` lets the caller attach metrics and notes
/// before the next step is recorded; once another step is pushed the
/// previous one is no longer reachable mutably.
#[derive(Debug)]
pub struct Recorder {
    engine: String,
    steps: Vec<Step>,
    next_id: StepId,
}

impl Recorder {
    /// Create an empty recorder for the named engine.
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            steps: Vec::new(),
            next_id: StepId(0),
        }
    }

    /// Record a new step with a snapshot of `state`.
    pub fn record<S: Serialize + ?Sized>(
        &mut self,
        description: impl Into<String>,
        state: &S,
    ) -> &mut Step {
        let state = serde_json::to_value(state).unwrap_or_else(|err| {
            tracing::warn!(engine = %self.engine, %err, "state not serializable, recording null");
            Value::Null
        });
        let id = self.next_id;
        self.next_id = id.next();
        let description = description.into();
        tracing::trace!(engine = %self.engine, step = id.0, %description, "recorded step");
        self.steps.push(Step {
            id,
            description,
            state,
            metrics: Metrics::new(),
            educational_notes: Vec::new(),
        });
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }

    /// Steps recorded so far.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps recorded so far.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Engine name this recorder was created for.
    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Seal the trace into a [`Simulation`].
    pub fn finish(
        self,
        outcome: Outcome,
        result: Value,
        complexity: Complexity,
        elapsed_us: u64,
        seed: Option<u64>,
    ) -> Simulation {
        let step_count = self.steps.len();
        Simulation {
            success: outcome.is_success(),
            outcome,
            result,
            steps: self.steps,
            metadata: Metadata {
                engine: self.engine,
                elapsed_us,
                step_count,
                complexity,
                seed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Frontier {
        open: Vec<u32>,
        closed: Vec<u32>,
    }

    #[test]
    fn ids_are_sequential_from_zero() {
        let mut rec = Recorder::new("t");
        for i in 0..5 {
            rec.record(format!("step {i}"), &i);
        }
        let ids: Vec<u64> = rec.steps().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    proptest::proptest! {
        #[test]
        fn ids_stay_dense(n in 0usize..200) {
            let mut rec = Recorder::new("t");
            for i in 0..n {
                rec.record("s", &i);
            }
            proptest::prop_assert_eq!(rec.steps().len(), n);
            for (i, step) in rec.steps().iter().enumerate() {
                proptest::prop_assert_eq!(step.id, StepId::from(i));
            }
        }
    }

    #[test]
    fn recorded_state_is_not_aliased() {
        let mut rec = Recorder::new("t");
        let mut frontier = Frontier {
            open: vec![1],
            closed: vec![],
        };
        rec.record("first", &frontier);
        frontier.open.push(2);
        frontier.closed.push(1);
        rec.record("second", &frontier);

        assert_eq!(rec.steps()[0].state, json!({"open": [1], "closed": []}));
        assert_eq!(rec.steps()[1].state, json!({"open": [1, 2], "closed": [1]}));
    }

    #[test]
    fn metrics_and_notes_chain() {
        let mut rec = Recorder::new("t");
        rec.record("s", &())
            .metric("cost", 4.5)
            .metric("visited", vec![1, 2])
            .note("first note")
            .note("second note");
        let step = &rec.steps()[0];
        assert_eq!(step.metrics.f64("cost"), Some(4.5));
        assert_eq!(step.metrics.get("visited"), Some(&json!([1, 2])));
        assert_eq!(step.educational_notes.len(), 2);
    }

    #[test]
    fn finish_derives_success_from_outcome() {
        let mut rec = Recorder::new("t");
        rec.record("only", &());
        let sim = rec.finish(
            Outcome::no_solution("none"),
            Value::Null,
            Complexity::new("O(1)", "O(1)"),
            0,
            None,
        );
        assert!(!sim.success);
        assert_eq!(sim.metadata.step_count, 1);
        assert_eq!(sim.metadata.engine, "t");
    }

    #[test]
    fn non_finite_floats_serialize_as_null() {
        let mut rec = Recorder::new("t");
        rec.record("nan", &f64::NAN);
        assert_eq!(rec.steps()[0].state, Value::Null);
    }
}
