//! The trace data model: [`Step`], [`Simulation`], and their parts.
//!
//! Everything here is plain, owned, JSON-compatible data. Engine working
//! structures never appear directly; they are serialized into
//! [`serde_json::Value`] at record time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParamError;
use crate::id::StepId;

/// Scalar or array measurements attached to a step, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics(pub IndexMap<String, Value>);

impl Metrics {
    /// An empty metric set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a metric by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Numeric metric as `f64`, if present and numeric.
    pub fn f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Number of metrics.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if no metric has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One immutable snapshot of algorithm progress.
///
/// # Examples
///
/// ```
/// use stepwise_core::Recorder;
///
/// let mut rec = Recorder::new("demo");
/// let mut queue = vec![1, 2, 3];
/// rec.record("initial queue", &queue).metric("size", queue.len());
/// queue.push(4);
///
/// // The recorded state is an owned copy.
/// let step = &rec.steps()[0];
/// assert_eq!(step.state, serde_json::json!([1, 2, 3]));
/// assert_eq!(step.metrics.f64("size"), Some(3.0));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Sequence number within the simulation.
    pub id: StepId,
    /// Narration of what just happened.
    pub description: String,
    /// Engine-specific structured snapshot.
    pub state: Value,
    /// Engine-specific measurements at this point.
    pub metrics: Metrics,
    /// Explanatory notes attached to this step only.
    pub educational_notes: Vec<String>,
}

impl Step {
    /// Attach a metric while the step is being created.
    pub fn metric<V: Serialize>(&mut self, key: &str, value: V) -> &mut Self {
        let value = serde_json::to_value(value).unwrap_or_else(|err| {
            tracing::warn!(key, %err, "metric not serializable, recording null");
            Value::Null
        });
        self.metrics.0.insert(key.to_owned(), value);
        self
    }

    /// Attach an explanatory note while the step is being created.
    pub fn note(&mut self, text: impl Into<String>) -> &mut Self {
        self.educational_notes.push(text.into());
        self
    }
}

/// How an engine run ended.
///
/// The four variants map onto the error taxonomy: a well-defined answer,
/// a proven absence of one, a work cap that tripped first, or input that
/// was rejected before the algorithm started.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outcome {
    /// The algorithm reached its terminal condition with an answer.
    Solved,
    /// The algorithm completed and proved there is no answer.
    NoSolution {
        /// Why no answer exists.
        reason: String,
    },
    /// A work cap was reached before any terminal condition.
    Bounded {
        /// Which cap tripped (e.g. `"max_expansions"`).
        limit: String,
        /// The configured value of that cap.
        cap: u64,
    },
    /// Input was rejected at the boundary; no step was recorded.
    InvalidParameter {
        /// The offending parameter.
        parameter: String,
        /// Description of the problem.
        reason: String,
    },
}

impl Outcome {
    /// Shorthand for [`Outcome::NoSolution`].
    pub fn no_solution(reason: impl Into<String>) -> Self {
        Self::NoSolution {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Outcome::Bounded`].
    pub fn bounded(limit: impl Into<String>, cap: u64) -> Self {
        Self::Bounded {
            limit: limit.into(),
            cap,
        }
    }

    /// `true` only for [`Outcome::Solved`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Solved)
    }
}

impl From<&ParamError> for Outcome {
    fn from(err: &ParamError) -> Self {
        Self::InvalidParameter {
            parameter: err.parameter().to_owned(),
            reason: err.to_string(),
        }
    }
}

/// Asymptotic cost description shown alongside a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    /// Time complexity, e.g. `"O(E log V)"`.
    pub time: String,
    /// Space complexity, e.g. `"O(V)"`.
    pub space: String,
}

impl Complexity {
    /// Build a complexity description.
    pub fn new(time: impl Into<String>, space: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            space: space.into(),
        }
    }
}

/// Execution statistics for one run. Descriptive only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Name of the engine that produced the run.
    pub engine: String,
    /// Wall-clock duration of the run in microseconds.
    pub elapsed_us: u64,
    /// Number of recorded steps.
    pub step_count: usize,
    /// Asymptotic cost of the algorithm.
    pub complexity: Complexity,
    /// Seed of the random source, for randomized engines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// The complete output of one engine invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    /// `true` iff `outcome` is [`Outcome::Solved`].
    pub success: bool,
    /// How the run ended.
    pub outcome: Outcome,
    /// The algorithm's final answer, independent of any presentation.
    pub result: Value,
    /// Ordered step trace.
    pub steps: Vec<Step>,
    /// Execution statistics.
    pub metadata: Metadata,
}

impl Simulation {
    /// A run whose input was rejected: no steps, `success == false`.
    pub fn rejected(engine: &str, complexity: Complexity, err: &ParamError) -> Self {
        tracing::warn!(engine, error = %err, "rejected engine parameters");
        Self {
            success: false,
            outcome: Outcome::from(err),
            result: Value::Null,
            steps: Vec::new(),
            metadata: Metadata {
                engine: engine.to_owned(),
                complexity,
                ..Metadata::default()
            },
        }
    }

    /// The step with the given id, if recorded.
    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.get(id.index())
    }

    /// The final step, if any.
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// `true` for a rejected run.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
