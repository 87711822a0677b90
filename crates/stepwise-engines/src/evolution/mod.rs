//! Evolutionary search.

pub mod genetic;

pub use genetic::{FitnessMode, GeneticAlgorithm, GeneticAlgorithmBuilder, GeneticResult, Selection};
