//! Categorical Naive Bayes with Laplace smoothing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};
use stepwise_stats::format::{fixed, percent};

/// Likelihood used for a feature value never seen in training.
pub const FALLBACK_LIKELIHOOD: f64 = 1e-6;

/// One labelled training row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Feature values, aligned with [`Dataset::features`].
    pub values: Vec<String>,
    /// Class label.
    pub label: String,
}

impl Example {
    /// Build a row from string slices.
    pub fn new(values: &[&str], label: &str) -> Self {
        Self {
            values: values.iter().map(|v| (*v).to_owned()).collect(),
            label: label.to_owned(),
        }
    }
}

/// Training data plus the instance to classify.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Feature names.
    pub features: Vec<String>,
    /// Labelled rows.
    pub training: Vec<Example>,
    /// Feature values of the instance to classify.
    pub query: Vec<String>,
}

impl Dataset {
    /// Build a dataset from string slices.
    pub fn new(features: &[&str], training: Vec<Example>, query: &[&str]) -> Self {
        Self {
            features: features.iter().map(|f| (*f).to_owned()).collect(),
            training,
            query: query.iter().map(|q| (*q).to_owned()).collect(),
        }
    }
}

/// Naive Bayes classifier.
///
/// Priors are class frequencies. The likelihood of value `v` for feature
/// `f` given class `c` is `(count(c, f = v) + 1) / (count(c) + V_f)`,
/// where `V_f` counts the distinct values of `f` in the whole training
/// set. Scores are summed in log space and normalised with a softmax;
/// ties in the posterior go to the class seen first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NaiveBayes {
    /// Likelihood for values absent from training. Default:
    /// [`FALLBACK_LIKELIHOOD`].
    pub fallback: f64,
}

impl Default for NaiveBayes {
    fn default() -> Self {
        Self {
            fallback: FALLBACK_LIKELIHOOD,
        }
    }
}

/// Posterior distribution and prediction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaiveBayesResult {
    /// Class priors.
    pub priors: IndexMap<String, f64>,
    /// Unnormalised log scores.
    pub log_scores: IndexMap<String, f64>,
    /// Normalised posteriors; they sum to 1.
    pub posteriors: IndexMap<String, f64>,
    /// Class with the highest posterior.
    pub prediction: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PriorRow {
    count: usize,
    prior: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccumulationSnapshot<'a> {
    class: &'a str,
    feature: &'a str,
    value: &'a str,
    likelihood: f64,
    seen_in_training: bool,
    scores: &'a IndexMap<String, f64>,
}

/// feature -> class -> value -> likelihood
type LikelihoodTable = IndexMap<String, IndexMap<String, IndexMap<String, f64>>>;

impl Engine for NaiveBayes {
    type Problem = Dataset;

    fn name(&self) -> &str {
        "naive-bayes"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n f + c f v)", "O(c f v)")
    }

    fn validate(&self, data: &Dataset) -> Result<(), ParamError> {
        if !(self.fallback > 0.0 && self.fallback <= 1.0) {
            return Err(ParamError::out_of_range("fallback", self.fallback, "(0, 1]"));
        }
        if data.features.is_empty() {
            return Err(ParamError::Empty { name: "features" });
        }
        if data.training.is_empty() {
            return Err(ParamError::Empty { name: "training" });
        }
        for (i, name) in data.features.iter().enumerate() {
            if data.features[..i].contains(name) {
                return Err(ParamError::inconsistent(format!(
                    "feature '{name}' is listed twice"
                )));
            }
        }
        let width = data.features.len();
        if let Some(i) = data.training.iter().position(|e| e.values.len() != width) {
            return Err(ParamError::inconsistent(format!(
                "training row {i} has {} value(s) for {width} feature(s)",
                data.training[i].values.len()
            )));
        }
        if data.query.len() != width {
            return Err(ParamError::inconsistent(format!(
                "query has {} value(s) for {width} feature(s)",
                data.query.len()
            )));
        }
        Ok(())
    }

    fn run(&self, data: &Dataset, rec: &mut Recorder) -> Conclusion {
        let total = data.training.len();
        tracing::debug!(rows = total, features = data.features.len(), "naive bayes started");

        let mut class_counts: IndexMap<String, usize> = IndexMap::new();
        for e in &data.training {
            *class_counts.entry(e.label.clone()).or_insert(0) += 1;
        }
        let priors: IndexMap<String, f64> = class_counts
            .iter()
            .map(|(c, &n)| (c.clone(), n as f64 / total as f64))
            .collect();
        let prior_rows: IndexMap<&str, PriorRow> = class_counts
            .iter()
            .map(|(c, &count)| {
                (
                    c.as_str(),
                    PriorRow {
                        count,
                        prior: count as f64 / total as f64,
                    },
                )
            })
            .collect();
        rec.record(
            format!(
                "Class priors from {total} training row(s): {}",
                priors
                    .iter()
                    .map(|(c, p)| format!("P({c}) = {}", fixed(*p, 3)))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            &prior_rows,
        )
        .metric("classes", priors.len())
        .note("A prior is the fraction of training rows carrying that class");

        // Distinct values per feature, first appearance order.
        let vocab: Vec<Vec<&str>> = (0..data.features.len())
            .map(|f| {
                let mut seen: Vec<&str> = Vec::new();
                for e in &data.training {
                    let v = e.values[f].as_str();
                    if !seen.contains(&v) {
                        seen.push(v);
                    }
                }
                seen
            })
            .collect();

        let mut table: LikelihoodTable = IndexMap::new();
        for (f, name) in data.features.iter().enumerate() {
            let mut per_class = IndexMap::new();
            for (class, &count) in &class_counts {
                let mut per_value = IndexMap::new();
                for &v in &vocab[f] {
                    let hits = data
                        .training
                        .iter()
                        .filter(|e| &e.label == class && e.values[f] == v)
                        .count();
                    let likelihood = (hits + 1) as f64 / (count + vocab[f].len()) as f64;
                    per_value.insert(v.to_owned(), likelihood);
                }
                per_class.insert(class.clone(), per_value);
            }
            table.insert(name.clone(), per_class);
        }
        rec.record(
            format!(
                "Likelihood table with Laplace smoothing over {} feature(s)",
                data.features.len()
            ),
            &table,
        )
        .metric(
            "entries",
            vocab.iter().map(Vec::len).sum::<usize>() * class_counts.len(),
        )
        .note("Adding one to every count keeps a value unseen for a class from zeroing its score");

        let mut scores: IndexMap<String, f64> = priors
            .iter()
            .map(|(c, p)| (c.clone(), p.ln()))
            .collect();
        for class in class_counts.keys() {
            for (f, feature) in data.features.iter().enumerate() {
                let value = data.query[f].as_str();
                let known = table
                    .get(feature)
                    .and_then(|by_class| by_class.get(class))
                    .and_then(|by_value| by_value.get(value))
                    .copied();
                let likelihood = known.unwrap_or(self.fallback);
                if let Some(score) = scores.get_mut(class) {
                    *score += likelihood.ln();
                }
                let running = scores.get(class).copied().unwrap_or(f64::NEG_INFINITY);
                let step = rec
                    .record(
                        format!(
                            "{class}: add log P({feature} = {value} | {class}) = log {}; score {}",
                            fixed(likelihood, 4),
                            fixed(running, 4)
                        ),
                        &AccumulationSnapshot {
                            class,
                            feature,
                            value,
                            likelihood,
                            seen_in_training: known.is_some(),
                            scores: &scores,
                        },
                    )
                    .metric("logScore", running);
                if known.is_none() {
                    step.note(format!(
                        "{value} never appears for {feature} in training; using the fallback {}",
                        self.fallback
                    ));
                }
            }
        }

        let max = scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = scores.values().map(|s| (s - max).exp()).collect();
        let norm: f64 = exp.iter().sum();
        let posteriors: IndexMap<String, f64> = scores
            .keys()
            .zip(&exp)
            .map(|(c, e)| (c.clone(), e / norm))
            .collect();
        let mut prediction = String::new();
        let mut best = f64::NEG_INFINITY;
        for (c, &p) in &posteriors {
            if p > best {
                best = p;
                prediction = c.clone();
            }
        }

        let result = NaiveBayesResult {
            priors,
            log_scores: scores,
            posteriors,
            prediction,
        };
        rec.record(
            format!(
                "Softmax over log scores: predict {} ({})",
                result.prediction,
                percent(best)
            ),
            &result,
        )
        .metric("confidence", best)
        .note("Subtracting the largest log score before exponentiating avoids underflow");
        Conclusion::solved(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(query: &[&str]) -> Dataset {
        Dataset::new(
            &["outlook", "windy"],
            vec![
                Example::new(&["sunny", "no"], "play"),
                Example::new(&["sunny", "yes"], "stay"),
                Example::new(&["rainy", "yes"], "stay"),
                Example::new(&["overcast", "no"], "play"),
                Example::new(&["rainy", "no"], "play"),
            ],
            query,
        )
    }

    fn result(sim: &stepwise_core::Simulation) -> NaiveBayesResult {
        serde_json::from_value(sim.result.clone()).unwrap()
    }

    #[test]
    fn smoothed_likelihoods_and_prediction() {
        let sim = NaiveBayes::default().simulate(&weather(&["sunny", "no"]));
        assert!(sim.success);
        // P(sunny | play) = (1 + 1) / (3 + 3)
        let sunny = sim.steps[1].state["outlook"]["play"]["sunny"].as_f64().unwrap();
        assert!((sunny - 2.0 / 6.0).abs() < 1e-12);
        // P(no | stay) = (0 + 1) / (2 + 2)
        let no = sim.steps[1].state["windy"]["stay"]["no"].as_f64().unwrap();
        assert!((no - 0.25).abs() < 1e-12);
        assert_eq!(result(&sim).prediction, "play");
    }

    #[test]
    fn posteriors_sum_to_one() {
        for q in [["sunny", "no"], ["rainy", "yes"], ["foggy", "maybe"]] {
            let sim = NaiveBayes::default().simulate(&weather(&q));
            let total: f64 = result(&sim).posteriors.values().sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn unseen_value_uses_fallback() {
        let sim = NaiveBayes::default().simulate(&weather(&["foggy", "no"]));
        let step = sim
            .steps
            .iter()
            .find(|s| s.state["value"] == "foggy")
            .unwrap();
        assert_eq!(step.state["seenInTraining"], false);
        assert_eq!(step.state["likelihood"], FALLBACK_LIKELIHOOD);
        assert!(!step.educational_notes.is_empty());
    }

    #[test]
    fn step_layout() {
        let sim = NaiveBayes::default().simulate(&weather(&["sunny", "yes"]));
        // priors, likelihoods, 2 classes x 2 features, softmax
        assert_eq!(sim.steps.len(), 1 + 1 + 4 + 1);
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut data = weather(&["sunny", "no"]);
        data.training[2].values.pop();
        assert!(NaiveBayes::default().simulate(&data).steps.is_empty());
        let empty = Dataset::new(&["a"], vec![], &["x"]);
        assert!(!NaiveBayes::default().simulate(&empty).success);
    }

    #[test]
    fn rejects_repeated_feature_names() {
        let data = Dataset::new(
            &["x", "x"],
            vec![Example::new(&["a", "b"], "c1"), Example::new(&["b", "a"], "c2")],
            &["a", "a"],
        );
        let sim = NaiveBayes::default().simulate(&data);
        assert!(sim.steps.is_empty());
        assert!(matches!(
            sim.outcome,
            stepwise_core::Outcome::InvalidParameter { ref reason, .. } if reason.contains("'x'")
        ));
    }
}
