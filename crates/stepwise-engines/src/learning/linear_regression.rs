//! Simple linear regression fitted by batch gradient descent.

use serde::{Deserialize, Serialize};
use stepwise_core::error::require_positive;
use stepwise_core::{Complexity, Conclusion, Engine, Limits, Outcome, ParamError, Recorder};
use stepwise_stats::format::fixed;
use stepwise_stats::summary::mean;

/// Gradient descent on mean squared error for `y ≈ slope·x + intercept`.
///
/// Both parameters start at zero and are updated together once per
/// epoch. The final step compares the result with the closed-form
/// ordinary least squares fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearRegression {
    /// Step size. Default: 0.01.
    pub learning_rate: f64,
    /// Full passes over the data. Default: 100.
    pub epochs: u64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            epochs: 100,
        }
    }
}

/// Fitted line and its least-squares reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionResult {
    /// Slope after the last epoch.
    pub slope: f64,
    /// Intercept after the last epoch.
    pub intercept: f64,
    /// Mean squared error after the last epoch.
    pub mse: f64,
    /// Closed-form slope.
    pub ols_slope: f64,
    /// Closed-form intercept.
    pub ols_intercept: f64,
    /// Mean squared error of the closed-form line.
    pub ols_mse: f64,
    /// Epochs run.
    pub epochs: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EpochSnapshot {
    epoch: u64,
    slope: f64,
    intercept: f64,
    mse: f64,
    gradient_slope: f64,
    gradient_intercept: f64,
}

fn mse(points: &[(f64, f64)], slope: f64, intercept: f64) -> f64 {
    let n = points.len() as f64;
    points
        .iter()
        .map(|&(x, y)| {
            let r = slope * x + intercept - y;
            r * r
        })
        .sum::<f64>()
        / n
}

fn least_squares(points: &[(f64, f64)]) -> (f64, f64) {
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (mx, my) = (mean(&xs).unwrap_or(0.0), mean(&ys).unwrap_or(0.0));
    let sxy: f64 = points.iter().map(|&(x, y)| (x - mx) * (y - my)).sum();
    let sxx: f64 = xs.iter().map(|x| (x - mx) * (x - mx)).sum();
    let slope = sxy / sxx;
    (slope, my - slope * mx)
}

impl Engine for LinearRegression {
    type Problem = [(f64, f64)];

    fn name(&self) -> &str {
        "linear-regression"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(epochs · n)", "O(1)")
    }

    fn validate(&self, points: &[(f64, f64)]) -> Result<(), ParamError> {
        require_positive("learning_rate", self.learning_rate)?;
        let max = Limits::default().max_iterations;
        if self.epochs == 0 || self.epochs > max {
            return Err(ParamError::out_of_range(
                "epochs",
                self.epochs,
                format!("1..={max}"),
            ));
        }
        if points.len() < 2 {
            return Err(ParamError::out_of_range("points", points.len(), ">= 2 points"));
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(ParamError::out_of_range("points", "non-finite", "finite coordinates"));
        }
        if points.iter().all(|p| p.0 == points[0].0) {
            return Err(ParamError::inconsistent("every x is equal, so the slope is undefined"));
        }
        Ok(())
    }

    fn run(&self, points: &[(f64, f64)], rec: &mut Recorder) -> Conclusion {
        let n = points.len() as f64;
        let (mut slope, mut intercept) = (0.0, 0.0);
        let initial = mse(points, slope, intercept);
        rec.record(
            format!("Start at slope 0, intercept 0 with MSE {}", fixed(initial, 4)),
            &EpochSnapshot {
                epoch: 0,
                slope,
                intercept,
                mse: initial,
                gradient_slope: 0.0,
                gradient_intercept: 0.0,
            },
        )
        .metric("mse", initial)
        .note("Each epoch moves both parameters against the gradient of the mean squared error");

        let mut loss = initial;
        for epoch in 1..=self.epochs {
            let (mut gm, mut gb) = (0.0, 0.0);
            for &(x, y) in points {
                let r = slope * x + intercept - y;
                gm += r * x;
                gb += r;
            }
            gm *= 2.0 / n;
            gb *= 2.0 / n;
            slope -= self.learning_rate * gm;
            intercept -= self.learning_rate * gb;
            loss = mse(points, slope, intercept);
            let snapshot = EpochSnapshot {
                epoch,
                slope,
                intercept,
                mse: loss,
                gradient_slope: gm,
                gradient_intercept: gb,
            };
            if !loss.is_finite() || !slope.is_finite() || !intercept.is_finite() {
                rec.record(
                    format!("Epoch {epoch}: loss is no longer finite, descent diverged"),
                    &snapshot,
                )
                .metric("epoch", epoch)
                .note("A smaller learning rate keeps each update inside the stable region");
                return Conclusion::new(
                    Outcome::no_solution(format!(
                        "gradient descent diverged at epoch {epoch} with learning rate {}",
                        self.learning_rate
                    )),
                    &snapshot,
                );
            }
            rec.record(
                format!(
                    "Epoch {epoch}: slope {}, intercept {}, MSE {}",
                    fixed(slope, 4),
                    fixed(intercept, 4),
                    fixed(loss, 4)
                ),
                &snapshot,
            )
            .metric("mse", loss)
            .metric("slope", slope)
            .metric("intercept", intercept);
        }

        let (ols_slope, ols_intercept) = least_squares(points);
        let result = RegressionResult {
            slope,
            intercept,
            mse: loss,
            ols_slope,
            ols_intercept,
            ols_mse: mse(points, ols_slope, ols_intercept),
            epochs: self.epochs,
        };
        rec.record(
            format!(
                "Closed-form least squares: slope {}, intercept {} (MSE {}); descent MSE {}",
                fixed(ols_slope, 4),
                fixed(ols_intercept, 4),
                fixed(result.ols_mse, 4),
                fixed(loss, 4)
            ),
            &result,
        )
        .metric("mseGap", result.mse - result.ols_mse)
        .note("Least squares is the exact minimum that gradient descent approaches");
        Conclusion::solved(&result)
    }
}
