//! Clustering engines and synthetic point data.
//!
//! Points are `Vec<f64>` of any common dimension; distances are
//! Euclidean.

pub mod dbscan;
pub mod kmeans;
pub mod synthetic;

use stepwise_core::ParamError;

pub use dbscan::{Dbscan, DbscanResult, PointKind};
pub use kmeans::{KMeans, KMeansInit, KMeansResult};
pub use synthetic::{Blobs, LabeledPoints};

/// Non-empty, one shared positive dimension, finite coordinates.
pub(crate) fn validate_points(points: &[Vec<f64>]) -> Result<(), ParamError> {
    let Some(first) = points.first() else {
        return Err(ParamError::Empty { name: "points" });
    };
    let dim = first.len();
    if dim == 0 {
        return Err(ParamError::out_of_range("points", "0 dimensions", ">= 1 dimension"));
    }
    for (i, p) in points.iter().enumerate() {
        if p.len() != dim {
            return Err(ParamError::inconsistent(format!(
                "point {i} has {} coordinates, expected {dim}",
                p.len()
            )));
        }
        if p.iter().any(|x| !x.is_finite()) {
            return Err(ParamError::out_of_range(
                "points",
                format!("point {i}"),
                "finite coordinates",
            ));
        }
    }
    Ok(())
}
