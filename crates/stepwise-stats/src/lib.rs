//! Metric and annotation utilities shared by Stepwise engines.
//!
//! - [`distance`]: vector and bit-string distances
//! - [`summary`]: mean, variance, min/max summaries
//! - [`special`]: ln Γ, erf/erfc, regularized incomplete beta
//! - [`distribution`]: [`Normal`] and [`StudentT`] with CDF and inverse CDF
//! - [`format`]: number and collection formatting for step narration
//!
//! # Precision
//!
//! The special functions are series and continued-fraction
//! approximations. `erfc` has fractional error below 1.2e-7 everywhere;
//! the incomplete beta converges to about 1e-12 for the parameter ranges
//! a t-test produces. Inputs outside a function's domain are clamped
//! rather than allowed to produce NaN.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod distance;
pub mod distribution;
pub mod format;
pub mod special;
pub mod summary;

pub use distribution::{Normal, StudentT, Tails};
pub use summary::Summary;
