//! Continuous distributions used by hypothesis tests.

use serde::{Deserialize, Serialize};

use crate::special::{erfc, regularized_incomplete_beta};

/// Which tail(s) of the distribution count as extreme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tails {
    /// H₁: parameter ≠ value.
    #[default]
    Two,
    /// H₁: parameter < value.
    Left,
    /// H₁: parameter > value.
    Right,
}

/// A continuous distribution with a CDF and its inverse.
pub trait Continuous {
    /// P(X ≤ x).
    fn cdf(&self, x: f64) -> f64;

    /// The x with `cdf(x) == p`. `p` is clamped into the open unit
    /// interval.
    fn inv_cdf(&self, p: f64) -> f64;

    /// Probability, under this distribution, of a statistic at least as
    /// extreme as `statistic` in the direction(s) given by `tails`.
    fn p_value(&self, statistic: f64, tails: Tails) -> f64 {
        let lower = self.cdf(statistic);
        let p = match tails {
            Tails::Two => 2.0 * lower.min(1.0 - lower),
            Tails::Left => lower,
            Tails::Right => 1.0 - lower,
        };
        p.clamp(0.0, 1.0)
    }

    /// Rejection-region boundaries at significance `alpha`: two values
    /// (lower, upper) for a two-tailed test, one otherwise.
    fn critical_values(&self, alpha: f64, tails: Tails) -> Vec<f64> {
        match tails {
            Tails::Two => vec![self.inv_cdf(alpha / 2.0), self.inv_cdf(1.0 - alpha / 2.0)],
            Tails::Left => vec![self.inv_cdf(alpha)],
            Tails::Right => vec![self.inv_cdf(1.0 - alpha)],
        }
    }
}

const P_FLOOR: f64 = 1e-15;

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.5
    } else {
        p.clamp(P_FLOOR, 1.0 - P_FLOOR)
    }
}

/// Normal distribution N(mean, sd²).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Normal {
    /// Mean.
    pub mean: f64,
    /// Standard deviation, clamped to be positive.
    pub sd: f64,
}

impl Normal {
    /// N(mean, sd²); a non-positive `sd` is clamped to `f64::EPSILON`.
    pub fn new(mean: f64, sd: f64) -> Self {
        let sd = if sd.is_finite() && sd > 0.0 {
            sd
        } else {
            f64::EPSILON
        };
        Self { mean, sd }
    }

    /// The standard normal N(0, 1).
    pub fn standard() -> Self {
        Self { mean: 0.0, sd: 1.0 }
    }
}

// Acklam's rational approximation for the standard normal quantile,
// relative error below 1.15e-9.
const ACKLAM_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_69e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const ACKLAM_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const ACKLAM_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const ACKLAM_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const ACKLAM_P_LOW: f64 = 0.024_25;

fn standard_normal_quantile(p: f64) -> f64 {
    let (a, b, c, d) = (ACKLAM_A, ACKLAM_B, ACKLAM_C, ACKLAM_D);
    let tail = |q: f64| {
        (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    };
    if p < ACKLAM_P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - ACKLAM_P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
            / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

impl Continuous for Normal {
    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return 0.5;
        }
        let z = (x - self.mean) / self.sd;
        (0.5 * erfc(-z / std::f64::consts::SQRT_2)).clamp(0.0, 1.0)
    }

    fn inv_cdf(&self, p: f64) -> f64 {
        self.mean + self.sd * standard_normal_quantile(clamp_probability(p))
    }
}

/// Student's t distribution with `df` degrees of freedom.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudentT {
    /// Degrees of freedom, at least 1.
    pub df: f64,
}

impl StudentT {
    /// Bisection iterations for [`Continuous::inv_cdf`].
    const MAX_BISECTIONS: usize = 200;

    /// t distribution with `df` degrees of freedom, clamped to at least 1.
    pub fn new(df: f64) -> Self {
        let df = if df.is_finite() && df >= 1.0 { df } else { 1.0 };
        Self { df }
    }
}

impl Continuous for StudentT {
    fn cdf(&self, t: f64) -> f64 {
        if t.is_nan() {
            return 0.5;
        }
        if t.is_infinite() {
            return if t > 0.0 { 1.0 } else { 0.0 };
        }
        let x = self.df / (self.df + t * t);
        let tail = 0.5 * regularized_incomplete_beta(self.df / 2.0, 0.5, x);
        if t >= 0.0 {
            1.0 - tail
        } else {
            tail
        }
    }

    fn inv_cdf(&self, p: f64) -> f64 {
        let p = clamp_probability(p);
        if (p - 0.5).abs() < f64::EPSILON {
            return 0.0;
        }
        let mut lo = -1.0;
        let mut hi = 1.0;
        while self.cdf(hi) < p && hi < 1e8 {
            hi *= 2.0;
        }
        while self.cdf(lo) > p && lo > -1e8 {
            lo *= 2.0;
        }
        for _ in 0..Self::MAX_BISECTIONS {
            let mid = 0.5 * (lo + hi);
            if self.cdf(mid) < p {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo < 1e-12 {
                break;
            }
        }
        0.5 * (lo + hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn standard_normal_reference_values() {
        let n = Normal::standard();
        assert!(close(n.cdf(0.0), 0.5, 1e-7));
        assert!(close(n.cdf(1.959_964), 0.975, 1e-6));
        assert!(close(n.inv_cdf(0.975), 1.959_963_985, 1e-6));
        assert!(close(n.inv_cdf(0.05), -1.644_853_627, 1e-6));
        assert!(close(n.inv_cdf(0.001), -3.090_232_306, 1e-6));
    }

    #[test]
    fn shifted_normal() {
        let n = Normal::new(10.0, 2.0);
        assert!(close(n.cdf(10.0), 0.5, 1e-7));
        assert!(close(n.inv_cdf(0.5), 10.0, 1e-9));
        assert_eq!(Normal::new(0.0, -1.0).sd, f64::EPSILON);
    }

    #[test]
    fn t_reference_values() {
        let t10 = StudentT::new(10.0);
        assert!(close(t10.inv_cdf(0.975), 2.228_138_852, 1e-6));
        let t5 = StudentT::new(5.0);
        assert!(close(t5.cdf(2.015_048_373), 0.95, 1e-7));
        let t1 = StudentT::new(1.0);
        // Cauchy: F(1) = 3/4
        assert!(close(t1.cdf(1.0), 0.75, 1e-9));
    }

    #[test]
    fn p_values_by_tail() {
        let n = Normal::standard();
        assert!(close(n.p_value(1.959_964, Tails::Two), 0.05, 1e-5));
        assert!(close(n.p_value(-1.644_854, Tails::Left), 0.05, 1e-5));
        assert!(close(n.p_value(1.644_854, Tails::Right), 0.05, 1e-5));
        assert!(close(n.p_value(0.0, Tails::Two), 1.0, 1e-6));
    }

    #[test]
    fn critical_values_by_tail() {
        let n = Normal::standard();
        let two = n.critical_values(0.05, Tails::Two);
        assert_eq!(two.len(), 2);
        assert!(close(two[0], -1.959_964, 1e-5));
        assert!(close(two[1], 1.959_964, 1e-5));
        assert_eq!(n.critical_values(0.05, Tails::Right).len(), 1);
    }

    #[test]
    fn invalid_inputs_are_clamped() {
        let t = StudentT::new(0.0);
        assert_eq!(t.df, 1.0);
        assert!(t.inv_cdf(0.0).is_finite());
        assert!(Normal::standard().inv_cdf(1.0).is_finite());
        assert_eq!(Normal::standard().cdf(f64::NAN), 0.5);
    }

    proptest! {
        #[test]
        fn t_inverse_roundtrips(df in 1.0f64..60.0, p in 0.001f64..0.999) {
            let t = StudentT::new(df);
            prop_assert!((t.cdf(t.inv_cdf(p)) - p).abs() < 1e-8);
        }

        #[test]
        fn normal_cdf_is_monotone(a in -6.0f64..6.0, b in -6.0f64..6.0) {
            let n = Normal::standard();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(n.cdf(lo) <= n.cdf(hi) + 1e-12);
        }
    }
}
