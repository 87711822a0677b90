//! Stepwise: algorithm engines that record every decision they make.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Stepwise sub-crates. For most users, adding `stepwise` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use stepwise::prelude::*;
//! use stepwise::engines::graph::{Dijkstra, Graph, RootedGraph};
//!
//! let graph = Graph::directed(&["A", "B", "C"])
//!     .with_edge("A", "B", 4.0)
//!     .with_edge("A", "C", 1.0)
//!     .with_edge("C", "B", 2.0);
//! let sim = Dijkstra.simulate(&RootedGraph::new(graph, "A"));
//!
//! assert!(sim.success);
//! assert_eq!(sim.result["distances"]["B"], serde_json::json!(3.0));
//!
//! // Every step is plain data; store it and check it later.
//! let json = stepwise::replay::to_json(&sim).unwrap();
//! let back = stepwise::replay::from_json(&json).unwrap();
//! assert!(stepwise::replay::compare(&sim, &back).is_none());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `stepwise-core` | Steps, simulations, the `Engine` trait, limits, seeding |
//! | [`space`] | `stepwise-space` | The 4-connected grid and distance heuristics |
//! | [`stats`] | `stepwise-stats` | Distributions, summaries and number formatting |
//! | [`engines`] | `stepwise-engines` | Every algorithm engine and the catalog |
//! | [`replay`] | `stepwise-replay` | Trace storage, hashing and replay comparison |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core trace types and the engine contract (`stepwise-core`).
///
/// [`types::Simulation`] and [`types::Step`] are what every engine
/// produces; [`types::Engine`] is the trait every engine implements.
pub use stepwise_core as types;

/// Grid and heuristics (`stepwise-space`).
pub use stepwise_space as space;

/// Statistical helpers shared by the engines (`stepwise-stats`).
///
/// Includes the [`stats::Normal`] and [`stats::StudentT`] distributions
/// behind the hypothesis tests.
pub use stepwise_stats as stats;

/// Algorithm engines (`stepwise-engines`).
///
/// [`engines::catalog`] lists every engine with its family and
/// complexity.
pub use stepwise_engines as engines;

/// Trace persistence and determinism checks (`stepwise-replay`).
///
/// Store runs with [`replay::write_trace`], load them with
/// [`replay::read_trace`] and re-run with [`replay::replay_and_compare`].
pub use stepwise_replay as replay;

/// Common imports for typical Stepwise usage.
///
/// ```rust
/// use stepwise::prelude::*;
/// ```
///
/// This imports the engine trait, the trace types, parameter errors and
/// the grid types most examples start from.
pub mod prelude {
    // Trace model and engine contract
    pub use stepwise_core::{
        Complexity, Conclusion, Engine, Limits, Metadata, Outcome, ParamError, Recorder,
        Simulation, Step, StepId,
    };

    // Space
    pub use stepwise_space::{Cell, Grid4, Heuristic};

    // Catalog
    pub use stepwise_engines::{catalog, EngineInfo, Family};

    // Replay
    pub use stepwise_replay::{compare, trace_hash, validate_trace, ReplayError};
}
