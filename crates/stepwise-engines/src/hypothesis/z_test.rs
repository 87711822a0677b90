//! One-sample z-test with known population standard deviation.

use serde::Serialize;
use stepwise_core::error::require_positive;
use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};
use stepwise_stats::distribution::{Normal, Tails};
use stepwise_stats::format::fixed;
use stepwise_stats::summary::mean;

use super::{check_common, decide, record_hypotheses, TestResult};

/// z = (x̄ − μ₀) / (σ / √n), compared against N(0, 1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZTest {
    /// Hypothesized mean μ₀. Default: 0.
    pub mu0: f64,
    /// Known population standard deviation. Default: 1.
    pub sigma: f64,
    /// Significance level. Default: 0.05.
    pub alpha: f64,
    /// Alternative direction. Default: two-tailed.
    pub tails: Tails,
}

impl Default for ZTest {
    fn default() -> Self {
        Self {
            mu0: 0.0,
            sigma: 1.0,
            alpha: 0.05,
            tails: Tails::Two,
        }
    }
}

impl ZTest {
    /// A test of `μ = mu0` with known `sigma`, two-tailed at α = 0.05.
    pub fn new(mu0: f64, sigma: f64) -> Self {
        Self {
            mu0,
            sigma,
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
struct StatisticSnapshot {
    sample_mean: f64,
    sigma: f64,
    standard_error: f64,
    statistic: Option<f64>,
}

impl Engine for ZTest {
    type Problem = [f64];

    fn name(&self) -> &str {
        "z-test"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n)", "O(1)")
    }

    fn validate(&self, samples: &[f64]) -> Result<(), ParamError> {
        check_common(samples, self.alpha)?;
        require_positive("sigma", self.sigma)?;
        if !self.mu0.is_finite() {
            return Err(ParamError::out_of_range("mu0", self.mu0, "a finite value"));
        }
        Ok(())
    }

    fn run(&self, samples: &[f64], rec: &mut Recorder) -> Conclusion {
        record_hypotheses(rec, samples, self.mu0, self.alpha, self.tails);

        let n = samples.len();
        let x_bar = mean(samples).unwrap_or(0.0);
        let se = self.sigma / (n as f64).sqrt();
        rec.record(
            format!(
                "x̄ = {}, SE = σ/√n = {}/√{n} = {}",
                fixed(x_bar, 4),
                self.sigma,
                fixed(se, 4)
            ),
            &StatisticSnapshot {
                sample_mean: x_bar,
                sigma: self.sigma,
                standard_error: se,
                statistic: None,
            },
        )
        .metric("sampleMean", x_bar)
        .metric("standardError", se)
        .note("With σ known, the sample mean is normal with spread σ/√n under H₀");

        let z = (x_bar - self.mu0) / se;
        rec.record(
            format!(
                "z = ({} − {}) / {} = {}",
                fixed(x_bar, 4),
                self.mu0,
                fixed(se, 4),
                fixed(z, 4)
            ),
            &StatisticSnapshot {
                sample_mean: x_bar,
                sigma: self.sigma,
                standard_error: se,
                statistic: Some(z),
            },
        )
        .metric("statistic", z);

        let (critical_values, p_value, reject_null) =
            decide(rec, &Normal::standard(), "z", z, self.alpha, self.tails);
        Conclusion::solved(&TestResult {
            n,
            sample_mean: x_bar,
            standard_error: se,
            statistic: z,
            df: None,
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

    fn result(test: ZTest, samples: &[f64]) -> TestResult {
        let sim = test.simulate(samples);
        assert!(sim.success);
        serde_json::from_value(sim.result).unwrap()
    }

    #[test]
    fn two_tailed_not_significant() {
        let r = result(ZTest::new(100.0, 5.0), &[102.0, 104.0, 98.0, 106.0, 100.0]);
        assert!((r.statistic - 0.894_427).abs() < 1e-5);
        assert!((r.critical_values[1] - 1.959_964).abs() < 1e-4);
        assert!((r.critical_values[0] + r.critical_values[1]).abs() < 1e-9);
        assert!((r.p_value - 0.371_093).abs() < 1e-3);
        assert!(!r.reject_null);
    }

    #[test]
    fn right_tailed_rejects() {
        let test = ZTest::new(100.0, 10.0).tails(Tails::Right);
        let r = result(test, &[110.0; 4]);
        assert!((r.statistic - 2.0).abs() < 1e-12);
        assert_eq!(r.critical_values.len(), 1);
        assert!((r.p_value - 0.022_750).abs() < 1e-4);
        assert!(r.reject_null);
        assert!(!result(test.alpha(0.01), &[110.0; 4]).reject_null);
    }

    #[test]
    fn left_tail_of_a_high_mean_is_large() {
        let r = result(ZTest::new(100.0, 10.0).tails(Tails::Left), &[110.0; 4]);
        assert!(r.p_value > 0.97);
    }

    #[test]
    fn step_layout() {
        let sim = ZTest::new(0.0, 1.0).simulate(&[0.5, -0.2, 0.3]);
        assert_eq!(sim.steps.len(), 6);
        assert!(sim.steps[0].description.starts_with("H₀: μ = 0"));
        assert!(sim.last_step().unwrap().description.contains("fail to reject"));
    }

    #[test]
    fn invalid_parameters() {
        assert!(ZTest::new(0.0, 0.0).simulate(&[1.0]).steps.is_empty());
        assert!(ZTest::new(0.0, 1.0).alpha(1.0).simulate(&[1.0]).steps.is_empty());
        assert!(ZTest::new(0.0, 1.0).simulate(&[]).steps.is_empty());
        assert!(ZTest::new(0.0, 1.0).simulate(&[f64::NAN]).steps.is_empty());
    }
}
