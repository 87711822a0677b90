//! Work caps shared by engines whose step count is not bounded by input
//! size alone.

/// Upper bounds on engine work.
///
/// Tripping any cap ends the run with
/// [`Outcome::Bounded`](crate::Outcome::Bounded) after a terminal step
/// naming the cap, never with a partial result labelled as solved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of recorded steps. Default: 100 000.
    pub max_steps: u64,
    /// Maximum iterations of an outer loop (node expansions, k-means
    /// rounds). Default: 10 000.
    pub max_iterations: u64,
    /// Maximum search depth for depth-limited search. Default: 64.
    pub max_depth: u64,
    /// Maximum distinct states held by a state-space search.
    /// Default: 200 000.
    pub max_states: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_steps: 100_000,
            max_iterations: 10_000,
            max_depth: 64,
            max_states: 200_000,
        }
    }
}

impl Limits {
    /// Check every cap is non-zero.
    pub fn validate(&self) -> Result<(), crate::ParamError> {
        let caps = [
            ("max_steps", self.max_steps),
            ("max_iterations", self.max_iterations),
            ("max_depth", self.max_depth),
            ("max_states", self.max_states),
        ];
        for (name, value) in caps {
            if value == 0 {
                return Err(crate::ParamError::out_of_range(name, value, ">= 1"));
            }
        }
        Ok(())
    }
}
