//! The [`Engine`] trait and [`Conclusion`].
//!
//! Every algorithm in the catalog satisfies one functional shape:
//! `(problem, parameters) -> Simulation`. Parameters live on the engine
//! value itself; the problem instance is passed per call.

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::error::ParamError;
use crate::recorder::Recorder;
use crate::trace::{Complexity, Outcome, Simulation};

/// What an engine's [`run`](Engine::run) hands back besides its trace.
#[derive(Clone, Debug, PartialEq)]
pub struct Conclusion {
    /// How the run ended.
    pub outcome: Outcome,
    /// The final answer as JSON.
    pub result: Value,
    /// Seed of the random source, for randomized engines.
    pub seed: Option<u64>,
}

impl Conclusion {
    /// A conclusion with the given outcome and serialized result.
    pub fn new<T: Serialize + ?Sized>(outcome: Outcome, result: &T) -> Self {
        let result = serde_json::to_value(result).unwrap_or_else(|err| {
            tracing::warn!(%err, "result not serializable, recording null");
            Value::Null
        });
        Self {
            outcome,
            result,
            seed: None,
        }
    }

    /// Shorthand for a [`Outcome::Solved`] conclusion.
    pub fn solved<T: Serialize + ?Sized>(result: &T) -> Self {
        Self::new(Outcome::Solved, result)
    }

    /// Attach the seed that drove a randomized run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// A stepwise algorithm engine.
///
/// # Contract
///
/// - [`validate`](Engine::validate) runs before any step is recorded and
///   is the only place input is rejected.
/// - [`run`](Engine::run) may assume validated input, must record at
///   least one step, and must end with an explicit terminal step when the
///   outcome is not [`Outcome::Solved`].
/// - Identical inputs produce identical traces unless the engine is
///   randomized, in which case the seed fixes the trace.
///
/// # Examples
///
/// ```
/// use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};
///
/// struct Sum;
///
/// impl Engine for Sum {
///     type Problem = Vec<i64>;
///     fn name(&self) -> &str { "sum" }
///     fn complexity(&self) -> Complexity { Complexity::new("O(n)", "O(1)") }
///     fn validate(&self, p: &Vec<i64>) -> Result<(), ParamError> {
///         if p.is_empty() { Err(ParamError::Empty { name: "values" }) } else { Ok(()) }
///     }
///     fn run(&self, p: &Vec<i64>, rec: &mut Recorder) -> Conclusion {
///         let mut total = 0;
///         for v in p {
///             total += v;
///             rec.record(format!("add {v}"), &total);
///         }
///         Conclusion::solved(&total)
///     }
/// }
///
/// let sim = Sum.simulate(&vec![1, 2, 3]);
/// assert!(sim.success);
/// assert_eq!(sim.steps.len(), 3);
/// assert_eq!(sim.result, serde_json::json!(6));
///
/// let rejected = Sum.simulate(&vec![]);
/// assert!(!rejected.success);
/// assert!(rejected.steps.is_empty());
/// ```
pub trait Engine {
    /// The problem instance this engine consumes.
    type Problem: ?Sized;

    /// Stable engine name used in metadata and logs.
    fn name(&self) -> &str;

    /// Asymptotic cost description.
    fn complexity(&self) -> Complexity;

    /// Check parameters and problem before anything is recorded.
    fn validate(&self, problem: &Self::Problem) -> Result<(), ParamError>;

    /// Execute the algorithm on validated input.
    fn run(&self, problem: &Self::Problem, rec: &mut Recorder) -> Conclusion;

    /// Validate, run, and assemble the complete [`Simulation`].
    fn simulate(&self, problem: &Self::Problem) -> Simulation {
        let name = self.name().to_owned();
        if let Err(err) = self.validate(problem) {
            return Simulation::rejected(&name, self.complexity(), &err);
        }
        tracing::debug!(engine = %name, "simulation started");
        let started = Instant::now();
        let mut rec = Recorder::new(name.clone());
        let conclusion = self.run(problem, &mut rec);
        let elapsed_us = started.elapsed().as_micros() as u64;
        let sim = rec.finish(
            conclusion.outcome,
            conclusion.result,
            self.complexity(),
            elapsed_us,
            conclusion.seed,
        );
        tracing::debug!(
            engine = %name,
            success = sim.success,
            steps = sim.steps.len(),
            elapsed_us,
            "simulation finished"
        );
        sim
    }
}
