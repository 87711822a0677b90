//! Association rule mining.

pub mod apriori;

pub use apriori::{Apriori, AprioriResult, Itemset, Rule};
