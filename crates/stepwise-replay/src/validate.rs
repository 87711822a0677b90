//! Structural checks on a trace.

use stepwise_core::{Outcome, Simulation};

use crate::error::ReplayError;
use crate::hash::trace_hash;

/// Check that a trace is well formed.
///
/// - `success` is `true` exactly when the outcome is `Solved`.
/// - A rejected trace (`InvalidParameter`) has no steps; any other trace
///   has at least one.
/// - Step ids run `0, 1, 2, ...` in order.
/// - `metadata.step_count` matches the number of steps.
pub fn validate_trace(sim: &Simulation) -> Result<(), ReplayError> {
    if sim.success != sim.outcome.is_success() {
        return Err(ReplayError::OutcomeMismatch {
            detail: format!("success is {} but outcome is {:?}", sim.success, sim.outcome),
        });
    }
    match (&sim.outcome, sim.steps.is_empty()) {
        (Outcome::InvalidParameter { .. }, false) => {
            return Err(ReplayError::OutcomeMismatch {
                detail: format!("rejected trace has {} step(s)", sim.steps.len()),
            });
        }
        (Outcome::InvalidParameter { .. }, true) => {}
        (_, true) => return Err(ReplayError::EmptyTrace),
        (_, false) => {}
    }
    if let Some((index, step)) = sim
        .steps
        .iter()
        .enumerate()
        .find(|(i, s)| s.id.0 != *i as u64)
    {
        return Err(ReplayError::NonMonotonicIds {
            index,
            found: step.id.0,
        });
    }
    if sim.metadata.step_count != sim.steps.len() {
        return Err(ReplayError::StepCountMismatch {
            recorded: sim.metadata.step_count,
            actual: sim.steps.len(),
        });
    }
    Ok(())
}

/// Check that a trace hashes to `expected`.
pub fn verify_hash(sim: &Simulation, expected: u64) -> Result<(), ReplayError> {
    let actual = trace_hash(sim);
    if actual == expected {
        Ok(())
    } else {
        Err(ReplayError::HashMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use stepwise_core::{Complexity, ParamError, Recorder, StepId};

    fn solved(steps: usize) -> Simulation {
        let mut rec = Recorder::new("t");
        for i in 0..steps {
            rec.record(format!("step {i}"), &i);
        }
        rec.finish(Outcome::Solved, Value::Null, Complexity::default(), 0, None)
    }

    #[test]
    fn well_formed_trace_passes() {
        assert!(validate_trace(&solved(3)).is_ok());
    }

    #[test]
    fn rejected_trace_passes() {
        let err = ParamError::Empty { name: "points" };
        let sim = Simulation::rejected("t", Complexity::default(), &err);
        assert!(validate_trace(&sim).is_ok());
    }

    #[test]
    fn empty_solved_trace_fails() {
        assert!(matches!(validate_trace(&solved(0)), Err(ReplayError::EmptyTrace)));
    }

    #[test]
    fn reordered_ids_fail() {
        let mut sim = solved(3);
        sim.steps.swap(0, 2);
        assert!(matches!(
            validate_trace(&sim),
            Err(ReplayError::NonMonotonicIds { index: 0, found: 2 })
        ));
        let mut sim = solved(2);
        sim.steps[1].id = StepId(5);
        assert!(validate_trace(&sim).is_err());
    }

    #[test]
    fn success_flag_must_match_outcome() {
        let mut sim = solved(1);
        sim.success = false;
        assert!(matches!(
            validate_trace(&sim),
            Err(ReplayError::OutcomeMismatch { .. })
        ));
    }

    #[test]
    fn step_count_must_match() {
        let mut sim = solved(2);
        sim.metadata.step_count = 3;
        assert!(matches!(
            validate_trace(&sim),
            Err(ReplayError::StepCountMismatch { recorded: 3, actual: 2 })
        ));
    }

    #[test]
    fn hash_verification() {
        let sim = solved(2);
        let hash = trace_hash(&sim);
        assert!(verify_hash(&sim, hash).is_ok());
        assert!(matches!(
            verify_hash(&sim, hash ^ 1),
            Err(ReplayError::HashMismatch { .. })
        ));
    }
}
