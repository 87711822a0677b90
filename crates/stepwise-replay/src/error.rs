//! Error types for trace encoding, validation, and verification.

use std::fmt;
use std::io;

/// Errors raised while reading, writing, or checking a trace.
#[derive(Debug)]
pub enum ReplayError {
    /// An I/O error occurred while reading or writing a stream.
    Io(io::Error),
    /// The JSON could not be encoded or decoded as a `Simulation`.
    Json(serde_json::Error),
    /// The envelope format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the envelope.
        found: u8,
    },
    /// A trace that was not rejected has no steps.
    EmptyTrace,
    /// Step ids are not `0, 1, 2, ...` in order.
    NonMonotonicIds {
        /// Position in the step list.
        index: usize,
        /// Id found at that position.
        found: u64,
    },
    /// `success` disagrees with the outcome, or a rejected trace has steps.
    OutcomeMismatch {
        /// Human-readable description of the disagreement.
        detail: String,
    },
    /// `metadata.step_count` disagrees with the number of steps.
    StepCountMismatch {
        /// Count recorded in the metadata.
        recorded: usize,
        /// Steps actually present.
        actual: usize,
    },
    /// A trace hash does not match the expected value.
    HashMismatch {
        /// Hash the trace was expected to have.
        expected: u64,
        /// Hash computed from the trace.
        actual: u64,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::EmptyTrace => write!(f, "trace has no steps"),
            Self::NonMonotonicIds { index, found } => {
                write!(f, "step at index {index} has id {found}")
            }
            Self::OutcomeMismatch { detail } => write!(f, "outcome mismatch: {detail}"),
            Self::StepCountMismatch { recorded, actual } => {
                write!(
                    f,
                    "metadata records {recorded} steps but the trace has {actual}"
                )
            }
            Self::HashMismatch { expected, actual } => {
                write!(
                    f,
                    "trace hash mismatch: expected={expected:#018x}, actual={actual:#018x}"
                )
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
