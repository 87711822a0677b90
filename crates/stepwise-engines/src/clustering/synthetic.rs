//! Seeded Gaussian blob generator for clustering demos, tests and benches.

use rand::Rng;
use serde::{Deserialize, Serialize};
use stepwise_core::rng::{resolve_seed, seeded};
use stepwise_core::ParamError;

/// One standard normal draw by the Box–Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - U keeps the argument of ln in (0, 1].
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Isotropic Gaussian clusters around fixed centres.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blobs {
    /// Cluster centres; all must share one dimension.
    pub centers: Vec<Vec<f64>>,
    /// Points drawn around each centre.
    pub points_per_center: usize,
    /// Standard deviation along every axis.
    pub spread: f64,
}

/// Generated points with the index of the centre each was drawn around.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoints {
    /// Coordinates.
    pub points: Vec<Vec<f64>>,
    /// Generating centre per point.
    pub labels: Vec<usize>,
}

impl Blobs {
    /// Check centres are non-empty and consistent and `spread` is usable.
    pub fn validate(&self) -> Result<(), ParamError> {
        super::validate_points(&self.centers)?;
        if !(self.spread.is_finite() && self.spread >= 0.0) {
            return Err(ParamError::out_of_range(
                "spread",
                self.spread,
                "a finite value >= 0",
            ));
        }
        Ok(())
    }

    /// Draw every point from `rng`, centre by centre.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> LabeledPoints {
        let mut points = Vec::with_capacity(self.centers.len() * self.points_per_center);
        let mut labels = Vec::with_capacity(points.capacity());
        for (label, center) in self.centers.iter().enumerate() {
            for _ in 0..self.points_per_center {
                points.push(
                    center
                        .iter()
                        .map(|c| c + self.spread * standard_normal(rng))
                        .collect(),
                );
                labels.push(label);
            }
        }
        LabeledPoints { points, labels }
    }

    /// Draw with a seeded generator and report the seed used.
    pub fn generate_seeded(&self, seed: Option<u64>) -> (LabeledPoints, u64) {
        let seed = resolve_seed(seed);
        tracing::debug!(seed, centers = self.centers.len(), "generating blobs");
        (self.generate(&mut seeded(seed)), seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Blobs {
        Blobs {
            centers: vec![vec![0.0, 0.0], vec![20.0, 20.0]],
            points_per_center: 50,
            spread: 1.0,
        }
    }

    #[test]
    fn same_seed_same_points() {
        let (a, sa) = blobs().generate_seeded(Some(3));
        let (b, _) = blobs().generate_seeded(Some(3));
        assert_eq!(sa, 3);
        assert_eq!(a, b);
        assert_eq!(a.points.len(), 100);
    }

    #[test]
    fn points_stay_near_their_centre() {
        let mut rng = seeded(5);
        let data = blobs().generate(&mut rng);
        for (p, &label) in data.points.iter().zip(&data.labels) {
            let c = &blobs().centers[label];
            let d = stepwise_stats::distance::euclidean(p, c);
            assert!(d < 8.0, "point {p:?} is {d} from centre {label}");
        }
    }

    #[test]
    fn normal_draws_have_unit_scale() {
        let mut rng = seeded(9);
        let xs: Vec<f64> = (0..20_000).map(|_| standard_normal(&mut rng)).collect();
        let mean = stepwise_stats::summary::mean(&xs).unwrap();
        let sd = stepwise_stats::summary::sample_std_dev(&xs).unwrap();
        assert!(mean.abs() < 0.05);
        assert!((sd - 1.0).abs() < 0.05);
    }

    #[test]
    fn zero_spread_collapses_onto_centres() {
        let b = Blobs {
            spread: 0.0,
            ..blobs()
        };
        assert!(b.validate().is_ok());
        let data = b.generate(&mut seeded(1));
        assert_eq!(data.points[0], vec![0.0, 0.0]);
        assert!(Blobs { spread: -1.0, ..blobs() }.validate().is_err());
    }
}
