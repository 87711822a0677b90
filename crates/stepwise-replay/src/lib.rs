//! Trace persistence and determinism verification for Stepwise.
//!
//! A [`Simulation`](stepwise_core::Simulation) is plain data; this crate
//! stores it, checks it, and compares it against a fresh run.
//!
//! # Architecture
//!
//! - [`to_json`] / [`from_json`] encode a bare trace (pretty or compact)
//! - [`write_trace`] / [`read_trace`] stream a sealed [`Envelope`] that
//!   carries a format version and the trace hash
//! - [`trace_hash`] folds the outcome, every step, and the result into
//!   one FNV-1a value; metadata is excluded
//! - [`compare`] and [`replay_and_compare`] locate the first divergence
//! - [`validate_trace`] checks structural invariants
//!
//! # Format
//!
//! ```text
//! { "format": 1, "hash": <u64>, "simulation": { ... } }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod compare;
pub mod error;
pub mod hash;
pub mod validate;

pub use codec::{from_json, read_trace, to_json, to_json_compact, write_trace, Envelope, Layout};
pub use compare::{compare, replay_and_compare, DivergenceKind, DivergenceReport};
pub use error::ReplayError;
pub use hash::{step_hash, trace_hash};
pub use validate::{validate_trace, verify_hash};

/// Current envelope format version.
pub const FORMAT_VERSION: u8 = 1;
