//! Core types and traits for the Stepwise algorithm trace framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the shared vocabulary every algorithm engine populates: step and
//! simulation records, the [`Recorder`] that captures them, the
//! [`Engine`] contract, parameter errors, and work limits.
//!
//! # Recording model
//!
//! An engine runs its algorithm to completion and calls
//! [`Recorder::record`] at every decision point. Each call serializes the
//! engine's typed snapshot into an owned JSON value, so a recorded
//! [`Step`] can never observe later mutation of the engine's working
//! memory. The finished [`Simulation`] is plain data and crosses any
//! process or rendering boundary as JSON.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod id;
pub mod limits;
pub mod recorder;
pub mod rng;
pub mod trace;

pub use engine::{Conclusion, Engine};
pub use error::ParamError;
pub use id::StepId;
pub use limits::Limits;
pub use recorder::Recorder;
pub use trace::{Complexity, Metadata, Metrics, Outcome, Simulation, Step};
