//! DBSCAN density clustering.

use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};
use stepwise_stats::distance::euclidean;
use stepwise_stats::format::fixed;

use super::validate_points;

/// Final role of a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointKind {
    /// Not yet examined.
    Unvisited,
    /// Has at least `min_pts` points within `eps`, itself included.
    Core,
    /// In a cluster but not core.
    Border,
    /// In no cluster.
    Noise,
}

/// Density-based clustering.
///
/// Points are examined in input order. A core point opens a new cluster,
/// numbered from 0 in order of discovery, which then absorbs every point
/// density-reachable from it. A noise point may later become a border
/// point of a cluster; core and border points never change role.
///
/// # Examples
///
/// ```
/// use stepwise_core::Engine;
/// use stepwise_engines::clustering::Dbscan;
///
/// let points = vec![
///     vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0],
///     vec![9.0, 9.0],
/// ];
/// let sim = Dbscan { eps: 1.5, min_pts: 3 }.simulate(&points);
/// assert_eq!(sim.result["labels"], serde_json::json!([0, 0, 0, -1]));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dbscan {
    /// Neighbourhood radius, inclusive.
    pub eps: f64,
    /// Neighbourhood size, itself included, that makes a point core.
    pub min_pts: usize,
}

impl Default for Dbscan {
    fn default() -> Self {
        Self {
            eps: 1.0,
            min_pts: 3,
        }
    }
}

/// Cluster assignment and roles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbscanResult {
    /// Cluster id per point, `-1` for noise.
    pub labels: Vec<i64>,
    /// Role per point.
    pub kinds: Vec<PointKind>,
    /// Points per cluster, indexed by cluster id.
    pub cluster_sizes: Vec<usize>,
    /// Number of core points.
    pub core_count: usize,
    /// Number of border points.
    pub border_count: usize,
    /// Number of noise points.
    pub noise_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DbscanSnapshot {
    current: Option<usize>,
    cluster: Option<usize>,
    neighbourhood: Vec<usize>,
    frontier: Vec<usize>,
    labels: Vec<i64>,
    kinds: Vec<PointKind>,
}

struct Scan<'a> {
    points: &'a [Vec<f64>],
    eps: f64,
    visited: Vec<bool>,
    labels: Vec<Option<usize>>,
    kinds: Vec<PointKind>,
    sizes: Vec<usize>,
}

impl<'a> Scan<'a> {
    fn region(&self, p: usize) -> Vec<usize> {
        (0..self.points.len())
            .filter(|&q| euclidean(&self.points[p], &self.points[q]) <= self.eps)
            .collect()
    }

    fn labels(&self) -> Vec<i64> {
        self.labels
            .iter()
            .map(|l| l.map_or(-1, |c| c as i64))
            .collect()
    }

    fn snapshot(
        &self,
        current: Option<usize>,
        cluster: Option<usize>,
        neighbourhood: &[usize],
        frontier: &[usize],
    ) -> DbscanSnapshot {
        DbscanSnapshot {
            current,
            cluster,
            neighbourhood: neighbourhood.to_vec(),
            frontier: frontier.to_vec(),
            labels: self.labels(),
            kinds: self.kinds.clone(),
        }
    }

    fn count(&self, kind: PointKind) -> usize {
        self.kinds.iter().filter(|&&k| k == kind).count()
    }

    fn assign(&mut self, q: usize, cluster: usize) {
        if self.labels[q].is_none() {
            self.labels[q] = Some(cluster);
            self.sizes[cluster] += 1;
        }
    }
}

impl Dbscan {
    /// Absorb everything density-reachable from core point `p`.
    fn expand(
        &self,
        scan: &mut Scan<'_>,
        p: usize,
        seeds: Vec<usize>,
        cluster: usize,
        rec: &mut Recorder,
    ) {
        let mut frontier = seeds;
        let mut queued = vec![false; scan.points.len()];
        for &q in &frontier {
            queued[q] = true;
        }
        let mut i = 0;
        while i < frontier.len() {
            let q = frontier[i];
            i += 1;
            if q == p {
                continue;
            }
            let was_noise = scan.kinds[q] == PointKind::Noise;
            let mut grown = Vec::new();
            let mut neighbourhood = Vec::new();
            if !scan.visited[q] {
                scan.visited[q] = true;
                neighbourhood = scan.region(q);
                if neighbourhood.len() >= self.min_pts {
                    scan.kinds[q] = PointKind::Core;
                    for &r in &neighbourhood {
                        if !queued[r] {
                            queued[r] = true;
                            frontier.push(r);
                            grown.push(r);
                        }
                    }
                }
            }
            let newly_assigned = scan.labels[q].is_none();
            scan.assign(q, cluster);
            if scan.kinds[q] != PointKind::Core {
                scan.kinds[q] = PointKind::Border;
            }

            let description = match (scan.kinds[q], was_noise) {
                (PointKind::Core, _) => format!(
                    "Point {q} is core ({} neighbours): add {} point(s) to cluster {cluster}'s frontier",
                    neighbourhood.len(),
                    grown.len()
                ),
                (_, true) => format!("Point {q} was noise, now a border point of cluster {cluster}"),
                _ if newly_assigned => format!("Point {q} joins cluster {cluster} as a border point"),
                _ => match scan.labels[q] {
                    Some(owner) if owner != cluster => {
                        format!("Point {q} is already a border point of cluster {owner}")
                    }
                    _ => format!("Point {q} already belongs to cluster {cluster}"),
                },
            };
            rec.record(
                description,
                &scan.snapshot(Some(q), Some(cluster), &neighbourhood, &frontier[i..]),
            )
            .metric("clusterSize", scan.sizes[cluster])
            .metric("frontierRemaining", frontier.len() - i);
        }
    }
}

impl Engine for Dbscan {
    type Problem = [Vec<f64>];

    fn name(&self) -> &str {
        "dbscan"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n^2)", "O(n)")
    }

    fn validate(&self, points: &[Vec<f64>]) -> Result<(), ParamError> {
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(ParamError::out_of_range("eps", self.eps, "a finite value > 0"));
        }
        if self.min_pts == 0 {
            return Err(ParamError::out_of_range("min_pts", 0, ">= 1"));
        }
        validate_points(points)
    }

    fn run(&self, points: &[Vec<f64>], rec: &mut Recorder) -> Conclusion {
        let n = points.len();
        let mut scan = Scan {
            points,
            eps: self.eps,
            visited: vec![false; n],
            labels: vec![None; n],
            kinds: vec![PointKind::Unvisited; n],
            sizes: Vec::new(),
        };
        rec.record(
            format!(
                "Initialize: {n} point(s), eps = {}, minPts = {}",
                fixed(self.eps, 3),
                self.min_pts
            ),
            &scan.snapshot(None, None, &[], &[]),
        )
        .note("A point is core when its eps-neighbourhood, itself included, holds at least minPts points");

        for p in 0..n {
            if scan.visited[p] {
                continue;
            }
            scan.visited[p] = true;
            let neighbourhood = scan.region(p);
            if neighbourhood.len() < self.min_pts {
                scan.kinds[p] = PointKind::Noise;
                rec.record(
                    format!(
                        "Point {p} has {} neighbour(s) < minPts: mark as noise",
                        neighbourhood.len()
                    ),
                    &scan.snapshot(Some(p), None, &neighbourhood, &[]),
                )
                .metric("neighbours", neighbourhood.len())
                .note("Noise may still become a border point if a later cluster reaches it");
                continue;
            }

            let cluster = scan.sizes.len();
            scan.sizes.push(0);
            scan.kinds[p] = PointKind::Core;
            scan.assign(p, cluster);
            rec.record(
                format!(
                    "Point {p} is core ({} neighbours): start cluster {cluster}",
                    neighbourhood.len()
                ),
                &scan.snapshot(Some(p), Some(cluster), &neighbourhood, &neighbourhood),
            )
            .metric("neighbours", neighbourhood.len())
            .metric("clusters", scan.sizes.len());

            self.expand(&mut scan, p, neighbourhood, cluster, rec);
            rec.record(
                format!(
                    "Cluster {cluster} complete with {} point(s)",
                    scan.sizes[cluster]
                ),
                &scan.snapshot(None, Some(cluster), &[], &[]),
            )
            .metric("clusterSize", scan.sizes[cluster]);
        }

        let result = DbscanResult {
            labels: scan.labels(),
            kinds: scan.kinds.clone(),
            cluster_sizes: scan.sizes.clone(),
            core_count: scan.count(PointKind::Core),
            border_count: scan.count(PointKind::Border),
            noise_count: scan.count(PointKind::Noise),
        };
        rec.record(
            format!(
                "Done: {} cluster(s), {} core, {} border, {} noise",
                result.cluster_sizes.len(),
                result.core_count,
                result.border_count,
                result.noise_count
            ),
            &scan.snapshot(None, None, &[], &[]),
        )
        .metric("clusters", result.cluster_sizes.len())
        .metric("clusterSizes", &result.cluster_sizes)
        .metric("core", result.core_count)
        .metric("border", result.border_count)
        .metric("noise", result.noise_count);
        Conclusion::solved(&result)
    }
}
