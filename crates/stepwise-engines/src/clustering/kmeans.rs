//! Lloyd's k-means.

use rand::Rng;
use serde::{Deserialize, Serialize};
use stepwise_core::rng::{resolve_seed, seeded};
use stepwise_core::{Complexity, Conclusion, Engine, Outcome, ParamError, Recorder};
use stepwise_stats::distance::squared_euclidean;
use stepwise_stats::format::fixed;

use super::validate_points;

/// How the first centroids are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KMeansInit {
    /// The first `k` points in input order.
    #[default]
    FirstK,
    /// `k` distinct points drawn at random.
    RandomPoints,
}

/// K-means clustering by alternating assignment and update.
///
/// A point goes to its nearest centroid, the lowest index winning ties.
/// A centroid whose cluster empties keeps its previous position. The run
/// converges when an assignment pass changes nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KMeans {
    /// Number of clusters, `1..=points`.
    pub k: usize,
    /// Assignment/update rounds before giving up. Default: 100.
    pub max_iterations: u64,
    /// Centroid initialisation.
    pub init: KMeansInit,
    /// Seed for [`KMeansInit::RandomPoints`]; `None` draws one.
    pub seed: Option<u64>,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            k: 3,
            max_iterations: 100,
            init: KMeansInit::FirstK,
            seed: None,
        }
    }
}

/// Final clustering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KMeansResult {
    /// Cluster per point.
    pub assignments: Vec<usize>,
    /// Final centroid positions.
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to assigned centroids.
    pub inertia: f64,
    /// Assignment passes performed.
    pub iterations: u64,
    /// Whether the last pass changed nothing.
    pub converged: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KMeansSnapshot<'a> {
    iteration: u64,
    centroids: &'a [Vec<f64>],
    assignments: &'a [Option<usize>],
    cluster_sizes: Vec<usize>,
}

fn sizes(assignments: &[Option<usize>], k: usize) -> Vec<usize> {
    let mut out = vec![0; k];
    for c in assignments.iter().flatten() {
        out[*c] += 1;
    }
    out
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_euclidean(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

impl KMeans {
    /// Run with an explicit random source.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        points: &[Vec<f64>],
        rng: &mut R,
        rec: &mut Recorder,
    ) -> Conclusion {
        let n = points.len();
        let dim = points.first().map_or(0, Vec::len);
        let chosen: Vec<usize> = match self.init {
            KMeansInit::FirstK => (0..self.k).collect(),
            KMeansInit::RandomPoints => rand::seq::index::sample(rng, n, self.k).into_vec(),
        };
        let mut centroids: Vec<Vec<f64>> = chosen.iter().map(|&i| points[i].clone()).collect();
        let mut assignments: Vec<Option<usize>> = vec![None; n];
        rec.record(
            format!("Initialize {} centroid(s) from points {chosen:?}", self.k),
            &KMeansSnapshot {
                iteration: 0,
                centroids: &centroids,
                assignments: &assignments,
                cluster_sizes: vec![0; self.k],
            },
        )
        .metric("k", self.k)
        .note("Each round assigns points to the nearest centroid, then moves centroids to their cluster means");

        for iteration in 1..=self.max_iterations {
            let mut changed = 0usize;
            let mut inertia = 0.0;
            for (p, point) in points.iter().enumerate() {
                let (c, d) = nearest(point, &centroids);
                inertia += d;
                if assignments[p] != Some(c) {
                    assignments[p] = Some(c);
                    changed += 1;
                }
            }
            rec.record(
                format!("Iteration {iteration}: assign points, {changed} changed cluster"),
                &KMeansSnapshot {
                    iteration,
                    centroids: &centroids,
                    assignments: &assignments,
                    cluster_sizes: sizes(&assignments, self.k),
                },
            )
            .metric("changed", changed)
            .metric("inertia", inertia);

            if changed == 0 {
                rec.record(
                    format!(
                        "Converged after {iteration} iteration(s), inertia {}",
                        fixed(inertia, 4)
                    ),
                    &KMeansSnapshot {
                        iteration,
                        centroids: &centroids,
                        assignments: &assignments,
                        cluster_sizes: sizes(&assignments, self.k),
                    },
                )
                .metric("inertia", inertia);
                return Conclusion::solved(&KMeansResult {
                    assignments: assignments.iter().map(|a| a.unwrap_or(0)).collect(),
                    centroids,
                    inertia,
                    iterations: iteration,
                    converged: true,
                });
            }

            let mut sums = vec![vec![0.0; dim]; self.k];
            let mut counts = vec![0usize; self.k];
            for (p, point) in points.iter().enumerate() {
                let Some(c) = assignments[p] else { continue };
                counts[c] += 1;
                for (s, x) in sums[c].iter_mut().zip(point) {
                    *s += x;
                }
            }
            let mut shift: f64 = 0.0;
            let mut kept = Vec::new();
            for c in 0..self.k {
                if counts[c] == 0 {
                    kept.push(c);
                    continue;
                }
                let updated: Vec<f64> = sums[c].iter().map(|s| s / counts[c] as f64).collect();
                shift = shift.max(squared_euclidean(&updated, &centroids[c]).sqrt());
                centroids[c] = updated;
            }
            let step = rec
                .record(
                    format!(
                        "Iteration {iteration}: move centroids to cluster means (max shift {})",
                        fixed(shift, 4)
                    ),
                    &KMeansSnapshot {
                        iteration,
                        centroids: &centroids,
                        assignments: &assignments,
                        cluster_sizes: counts.clone(),
                    },
                )
                .metric("maxShift", shift);
            if !kept.is_empty() {
                step.note(format!(
                    "Cluster(s) {kept:?} are empty and keep their previous centroid"
                ));
            }
        }

        rec.record(
            format!("Iteration cap {} reached before convergence", self.max_iterations),
            &KMeansSnapshot {
                iteration: self.max_iterations,
                centroids: &centroids,
                assignments: &assignments,
                cluster_sizes: sizes(&assignments, self.k),
            },
        );
        let inertia = points
            .iter()
            .zip(&assignments)
            .map(|(p, a)| squared_euclidean(p, &centroids[a.unwrap_or(0)]))
            .sum();
        Conclusion::new(
            Outcome::bounded("max_iterations", self.max_iterations),
            &KMeansResult {
                assignments: assignments.iter().map(|a| a.unwrap_or(0)).collect(),
                centroids,
                inertia,
                iterations: self.max_iterations,
                converged: false,
            },
        )
    }
}

impl Engine for KMeans {
    type Problem = [Vec<f64>];

    fn name(&self) -> &str {
        "kmeans"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n k d i)", "O(n + k d)")
    }

    fn validate(&self, points: &[Vec<f64>]) -> Result<(), ParamError> {
        validate_points(points)?;
        if self.k == 0 || self.k > points.len() {
            return Err(ParamError::out_of_range(
                "k",
                self.k,
                format!("1..={} (the number of points)", points.len()),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ParamError::out_of_range("max_iterations", 0, ">= 1"));
        }
        Ok(())
    }

    fn run(&self, points: &[Vec<f64>], rec: &mut Recorder) -> Conclusion {
        match self.init {
            KMeansInit::FirstK => self.run_with_rng(points, &mut seeded(0), rec),
            KMeansInit::RandomPoints => {
                let seed = resolve_seed(self.seed);
                self.run_with_rng(points, &mut seeded(seed), rec)
                    .with_seed(seed)
            }
        }
    }
}
