//! Supervised learning: a categorical classifier and a line fit.

pub mod linear_regression;
pub mod naive_bayes;

pub use linear_regression::{LinearRegression, RegressionResult};
pub use naive_bayes::{Dataset, Example, NaiveBayes, NaiveBayesResult, FALLBACK_LIKELIHOOD};
