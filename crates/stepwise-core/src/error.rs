//! Error types for the Stepwise framework.
//!
//! Engines never surface these as panics or `Err` returns to their
//! callers: a [`ParamError`] detected at the boundary becomes a rejected
//! [`Simulation`](crate::Simulation) with zero steps and
//! [`Outcome::InvalidParameter`](crate::Outcome::InvalidParameter).

use std::error::Error;
use std::fmt;

/// Malformed or out-of-range engine input, detected before any step is
/// recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamError {
    /// A numeric parameter lies outside its legal range.
    OutOfRange {
        /// Parameter name as exposed to callers.
        name: &'static str,
        /// The rejected value, rendered for display.
        value: String,
        /// Human-readable description of the legal range.
        expected: String,
    },
    /// A collection parameter that must be non-empty was empty.
    Empty {
        /// Parameter name.
        name: &'static str,
    },
    /// A reference to something the problem does not define
    /// (unknown node, state, symbol, or cell).
    Unknown {
        /// Parameter name.
        name: &'static str,
        /// The unresolved reference.
        value: String,
    },
    /// Parameters are individually valid but contradict each other.
    Inconsistent {
        /// Description of the contradiction.
        reason: String,
    },
}

impl ParamError {
    /// Shorthand for [`ParamError::OutOfRange`].
    pub fn out_of_range(
        name: &'static str,
        value: impl fmt::Display,
        expected: impl Into<String>,
    ) -> Self {
        Self::OutOfRange {
            name,
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Shorthand for [`ParamError::Unknown`].
    pub fn unknown(name: &'static str, value: impl fmt::Display) -> Self {
        Self::Unknown {
            name,
            value: value.to_string(),
        }
    }

    /// Shorthand for [`ParamError::Inconsistent`].
    pub fn inconsistent(reason: impl Into<String>) -> Self {
        Self::Inconsistent {
            reason: reason.into(),
        }
    }

    /// Name of the offending parameter, or `"parameters"` when the error
    /// concerns several at once.
    pub fn parameter(&self) -> &str {
        match self {
            Self::OutOfRange { name, .. } | Self::Empty { name } | Self::Unknown { name, .. } => {
                name
            }
            Self::Inconsistent { .. } => "parameters",
        }
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                name,
                value,
                expected,
            } => write!(f, "{name} = {value} is out of range (expected {expected})"),
            Self::Empty { name } => write!(f, "{name} must not be empty"),
            Self::Unknown { name, value } => write!(f, "{name} refers to unknown '{value}'"),
            Self::Inconsistent { reason } => write!(f, "inconsistent parameters: {reason}"),
        }
    }
}

impl Error for ParamError {}

/// Check that a finite float lies in `(0, +inf)`.
pub fn require_positive(name: &'static str, value: f64) -> Result<(), ParamError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParamError::out_of_range(name, value, "a finite value > 0"))
    }
}

/// Check that a probability lies in `[0, 1]`.
pub fn require_probability(name: &'static str, value: f64) -> Result<(), ParamError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ParamError::out_of_range(name, value, "[0, 1]"))
    }
}

/// Check that a slice is non-empty.
pub fn require_non_empty<T>(name: &'static str, items: &[T]) -> Result<(), ParamError> {
    if items.is_empty() {
        Err(ParamError::Empty { name })
    } else {
        Ok(())
    }
}
