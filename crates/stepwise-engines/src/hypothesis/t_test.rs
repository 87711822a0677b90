//! One-sample Student's t-test.

use serde::Serialize;
use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};
use stepwise_stats::distribution::{StudentT, Tails};
use stepwise_stats::format::fixed;
use stepwise_stats::summary::{mean, sample_std_dev};

use super::{check_common, decide, record_hypotheses, TestResult};

/// t = (x̄ − μ₀) / (s / √n) with n − 1 degrees of freedom.
///
/// `s` is the sample standard deviation. At least two samples are
/// required, and they must not all be equal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TTest {
    /// Hypothesized mean μ₀. Default: 0.
    pub mu0: f64,
    /// Significance level. Default: 0.05.
    pub alpha: f64,
    /// Alternative direction. Default: two-tailed.
    pub tails: Tails,
}

impl Default for TTest {
    fn default() -> Self {
        Self {
            mu0: 0.0,
            alpha: 0.05,
            tails: Tails::Two,
        }
    }
}

impl TTest {
    /// A two-tailed test of `μ = mu0` at α = 0.05.
    pub fn new(mu0: f64) -> Self {
        Self {
            mu0,
            ..Self::default()
        }
    }

    /// Set the significance level.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the alternative direction.
    pub fn tails(mut self, tails: Tails) -> Self {
        self.tails = tails;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SampleSnapshot {
    n: usize,
    sample_mean: f64,
    deviations: Vec<f64>,
    sum_of_squares: f64,
    std_dev: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatisticSnapshot {
    standard_error: f64,
    statistic: f64,
    df: f64,
}

impl Engine for TTest {
    type Problem = [f64];

    fn name(&self) -> &str {
        "t-test"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n)", "O(n)")
    }

    fn validate(&self, samples: &[f64]) -> Result<(), ParamError> {
        check_common(samples, self.alpha)?;
        if samples.len() < 2 {
            return Err(ParamError::out_of_range("samples", samples.len(), "at least 2 values"));
        }
        if !self.mu0.is_finite() {
            return Err(ParamError::out_of_range("mu0", self.mu0, "a finite value"));
        }
        match sample_std_dev(samples) {
            Some(s) if s > 0.0 => Ok(()),
            _ => Err(ParamError::inconsistent(
                "all samples are equal, so the standard deviation is zero",
            )),
        }
    }

    fn run(&self, samples: &[f64], rec: &mut Recorder) -> Conclusion {
        record_hypotheses(rec, samples, self.mu0, self.alpha, self.tails);

        let n = samples.len();
        let x_bar = mean(samples).unwrap_or(0.0);
        let s = sample_std_dev(samples).unwrap_or(f64::EPSILON);
        let deviations: Vec<f64> = samples.iter().map(|v| v - x_bar).collect();
        let sum_of_squares: f64 = deviations.iter().map(|d| d * d).sum();
        rec.record(
            format!(
                "x̄ = {}, s = √(Σ(x − x̄)² / (n − 1)) = {}",
                fixed(x_bar, 4),
                fixed(s, 4)
            ),
            &SampleSnapshot {
                n,
                sample_mean: x_bar,
                deviations,
                sum_of_squares,
                std_dev: s,
            },
        )
        .metric("sampleMean", x_bar)
        .metric("stdDev", s)
        .note("Dividing by n − 1 corrects the bias of estimating σ from the same sample");

        let se = s / (n as f64).sqrt();
        let df = (n - 1) as f64;
        let t = (x_bar - self.mu0) / se;
        rec.record(
            format!(
                "t = ({} − {}) / ({} / √{n}) = {} with df = {df}",
                fixed(x_bar, 4),
                self.mu0,
                fixed(s, 4),
                fixed(t, 4)
            ),
            &StatisticSnapshot {
                standard_error: se,
                statistic: t,
                df,
            },
        )
        .metric("statistic", t)
        .metric("df", df)
        .note("Estimating σ adds uncertainty, so the t distribution has heavier tails than the normal");

        let (critical_values, p_value, reject_null) =
            decide(rec, &StudentT::new(df), "t", t, self.alpha, self.tails);
        Conclusion::solved(&TestResult {
            n,
            sample_mean: x_bar,
            standard_error: se,
            statistic: t,
            df: Some(df),
            critical_values,
            p_value,
            alpha: self.alpha,
            tails: self.tails,
            reject_null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_core::Outcome;

    fn result(test: TTest, samples: &[f64]) -> TestResult {
        let sim = test.simulate(samples);
        assert!(sim.success);
        serde_json::from_value(sim.result).unwrap()
    }

    #[test]
    fn small_sample_two_tailed() {
        let r = result(TTest::new(2.0), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((r.statistic - std::f64::consts::SQRT_2).abs() < 1e-9);
        assert_eq!(r.df, Some(4.0));
        assert!((r.critical_values[1] - 2.776_445).abs() < 1e-3);
        assert!((r.p_value - 0.230).abs() < 0.01);
        assert!(!r.reject_null);
    }

    #[test]
    fn heavier_tails_than_normal() {
        let r = result(TTest::new(0.0).tails(Tails::Right), &[1.0, 2.0, 3.0]);
        assert!(r.critical_values[0] > 1.645);
    }

    #[test]
    fn clear_shift_rejects() {
        let samples = [10.1, 9.8, 10.3, 10.0, 9.9, 10.2];
        assert!(result(TTest::new(5.0), &samples).reject_null);
        assert!(!result(TTest::new(10.05), &samples).reject_null);
    }

    #[test]
    fn constant_samples_are_inconsistent() {
        let sim = TTest::new(1.0).simulate(&[3.0, 3.0, 3.0]);
        assert!(sim.steps.is_empty());
        assert!(matches!(sim.outcome, Outcome::InvalidParameter { .. }));
        assert!(TTest::new(1.0).simulate(&[3.0]).steps.is_empty());
    }
}
