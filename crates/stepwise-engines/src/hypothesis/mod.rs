//! One-sample hypothesis tests on the mean.
//!
//! Both engines share the last three steps: critical values from the
//! reference distribution, the p-value of the observed statistic, and
//! the decision "reject H₀ iff p < α".

pub mod t_test;
pub mod z_test;

use serde::{Deserialize, Serialize};
use stepwise_core::error::require_non_empty;
use stepwise_core::{ParamError, Recorder};
use stepwise_stats::distribution::{Continuous, Tails};
use stepwise_stats::format::fixed;

pub use t_test::TTest;
pub use z_test::ZTest;

/// Final answer of a one-sample test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Sample size.
    pub n: usize,
    /// Sample mean.
    pub sample_mean: f64,
    /// Standard error of the mean.
    pub standard_error: f64,
    /// Observed z or t.
    pub statistic: f64,
    /// Degrees of freedom for a t-test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub df: Option<f64>,
    /// Rejection-region boundaries.
    pub critical_values: Vec<f64>,
    /// Probability of a statistic at least this extreme under H₀.
    pub p_value: f64,
    /// Significance level.
    pub alpha: f64,
    /// Alternative hypothesis direction.
    pub tails: Tails,
    /// `p_value < alpha`.
    pub reject_null: bool,
}

pub(crate) fn check_common(samples: &[f64], alpha: f64) -> Result<(), ParamError> {
    require_non_empty("samples", samples)?;
    if let Some(v) = samples.iter().find(|v| !v.is_finite()) {
        return Err(ParamError::out_of_range("samples", v, "finite values"));
    }
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ParamError::out_of_range("alpha", alpha, "(0, 1)"));
    }
    Ok(())
}

fn relation(tails: Tails) -> (&'static str, &'static str) {
    match tails {
        Tails::Two => ("=", "≠"),
        Tails::Left => ("≥", "<"),
        Tails::Right => ("≤", ">"),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HypothesesSnapshot<'a> {
    null: String,
    alternative: String,
    alpha: f64,
    tails: Tails,
    samples: &'a [f64],
}

pub(crate) fn record_hypotheses(rec: &mut Recorder, samples: &[f64], mu0: f64, alpha: f64, tails: Tails) {
    let (null, alt) = relation(tails);
    let snapshot = HypothesesSnapshot {
        null: format!("μ {null} {mu0}"),
        alternative: format!("μ {alt} {mu0}"),
        alpha,
        tails,
        samples,
    };
    rec.record(
        format!(
            "H₀: {}, H₁: {}, α = {alpha}",
            snapshot.null, snapshot.alternative
        ),
        &snapshot,
    )
    .metric("n", samples.len())
    .note("The test asks how surprising the sample would be if H₀ were true");
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecisionSnapshot<'a> {
    statistic: f64,
    critical_values: &'a [f64],
    p_value: Option<f64>,
    reject_null: Option<bool>,
}

/// Record the critical-value, p-value, and decision steps.
pub(crate) fn decide<D: Continuous>(
    rec: &mut Recorder,
    dist: &D,
    symbol: &str,
    statistic: f64,
    alpha: f64,
    tails: Tails,
) -> (Vec<f64>, f64, bool) {
    let critical = dist.critical_values(alpha, tails);
    let region = match (tails, critical.as_slice()) {
        (Tails::Two, [lo, hi]) => format!("{symbol} < {} or {symbol} > {}", fixed(*lo, 4), fixed(*hi, 4)),
        (Tails::Left, [c]) => format!("{symbol} < {}", fixed(*c, 4)),
        (_, [c, ..]) => format!("{symbol} > {}", fixed(*c, 4)),
        _ => String::new(),
    };
    rec.record(
        format!("Rejection region at α = {alpha}: {region}"),
        &DecisionSnapshot {
            statistic,
            critical_values: &critical,
            p_value: None,
            reject_null: None,
        },
    )
    .metric("criticalValues", &critical);

    let p = dist.p_value(statistic, tails);
    rec.record(
        format!("p-value for {symbol} = {}: {}", fixed(statistic, 4), fixed(p, 4)),
        &DecisionSnapshot {
            statistic,
            critical_values: &critical,
            p_value: Some(p),
            reject_null: None,
        },
    )
    .metric("pValue", p)
    .note("The p-value is the tail area beyond the observed statistic");

    let reject = p < alpha;
    let description = if reject {
        format!("p = {} < α = {alpha}: reject H₀", fixed(p, 4))
    } else {
        format!("p = {} ≥ α = {alpha}: fail to reject H₀", fixed(p, 4))
    };
    rec.record(
        description,
        &DecisionSnapshot {
            statistic,
            critical_values: &critical,
            p_value: Some(p),
            reject_null: Some(reject),
        },
    )
    .metric("rejectNull", reject)
    .note("Failing to reject H₀ is not evidence that H₀ is true");
    (critical, p, reject)
}
