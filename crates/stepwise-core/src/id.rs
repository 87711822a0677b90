//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a [`Step`](crate::Step) within its simulation.
///
/// Assigned by the [`Recorder`](crate::Recorder) in push order starting
/// at zero. `StepId(n)` is always the n-th element of
/// `Simulation::steps`, which is what makes the id a total order.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StepId(pub u64);

impl StepId {
    /// The id as a slice index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The id that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl From<usize> for StepId {
    fn from(v: usize) -> Self {
        Self(v as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_id_orders_numerically() {
        assert!(StepId(2) < StepId(10));
        assert_eq!(StepId(4).next(), StepId(5));
        assert_eq!(StepId::from(7usize).index(), 7);
    }

    #[test]
    fn step_id_serializes_as_bare_number() {
        let v = serde_json::to_value(StepId(3)).unwrap();
        assert_eq!(v, serde_json::json!(3));
    }
}
