//! Instrumented algorithm engines for the Stepwise trace framework.
//!
//! Every engine implements [`stepwise_core::Engine`]: parameters live on
//! the engine value, the problem instance is passed per call, and
//! [`simulate`](stepwise_core::Engine::simulate) returns a complete,
//! replayable [`Simulation`](stepwise_core::Simulation).
//!
//! # Families
//!
//! | Module | Engines |
//! |--------|---------|
//! | [`pathfinding`] | A* on a 4-connected grid, BFS on the 8-puzzle |
//! | [`graph`] | Dijkstra, Bellman-Ford, Kruskal, Prim, BFS/DFS traversal |
//! | [`clustering`] | K-Means, DBSCAN, seeded synthetic point sets |
//! | [`evolution`] | Genetic algorithm over bit strings |
//! | [`learning`] | Categorical Naive Bayes, gradient-descent linear regression |
//! | [`mining`] | Apriori itemsets and association rules |
//! | [`scheduling`] | CPU scheduling, disk scheduling, Banker's algorithm, page replacement |
//! | [`compression`] | Huffman, run-length, LZW |
//! | [`automata`] | DFA and ε-NFA acceptance |
//! | [`database`] | Transaction schedule classification |
//! | [`hypothesis`] | One-sample z- and t-tests |
//!
//! [`catalog()`] lists every engine with its family and complexity.
//!
//! # Determinism
//!
//! Identical inputs give identical steps. Randomness enters only through
//! a seed: [`GeneticAlgorithm`](evolution::GeneticAlgorithm) and
//! [`KMeans`](clustering::KMeans) with random initialisation record the
//! seed they used in the run's metadata, and
//! [`Blobs::generate_seeded`](clustering::Blobs::generate_seeded)
//! returns it alongside the points.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod automata;
pub mod catalog;
pub mod clustering;
pub mod compression;
pub mod database;
pub mod evolution;
pub mod graph;
pub mod hypothesis;
pub mod learning;
pub mod mining;
pub mod pathfinding;
pub mod scheduling;

pub use catalog::{catalog, EngineInfo, Family};
