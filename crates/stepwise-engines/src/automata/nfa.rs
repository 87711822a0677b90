//! ε-NFA simulation by tracking the set of active states.

use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};
use stepwise_stats::format::set;

use super::{index_states, require_state, require_symbols, to_strings};

/// An NFA with optional ε-moves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nfa {
    /// State names.
    pub states: Vec<String>,
    /// Input symbols.
    pub alphabet: Vec<char>,
    /// Start state.
    pub start: String,
    /// Accepting states.
    pub accepting: Vec<String>,
    /// `(from, symbol, to)`; a `None` symbol is an ε-move.
    pub transitions: Vec<(String, Option<char>, String)>,
}

impl Nfa {
    /// An NFA with no transitions yet.
    pub fn new(states: &[&str], alphabet: &str, start: &str, accepting: &[&str]) -> Self {
        Self {
            states: to_strings(states),
            alphabet: alphabet.chars().collect(),
            start: start.to_owned(),
            accepting: to_strings(accepting),
            transitions: Vec::new(),
        }
    }

    /// Add a move on `symbol`.
    pub fn with_transition(mut self, from: &str, symbol: char, to: &str) -> Self {
        self.transitions
            .push((from.to_owned(), Some(symbol), to.to_owned()));
        self
    }

    /// Add an ε-move.
    pub fn with_epsilon(mut self, from: &str, to: &str) -> Self {
        self.transitions.push((from.to_owned(), None, to.to_owned()));
        self
    }

    fn check(&self) -> Result<(), ParamError> {
        let index = index_states(&self.states)?;
        require_state(&index, "start", &self.start)?;
        for s in &self.accepting {
            require_state(&index, "accepting", s)?;
        }
        for (from, symbol, to) in &self.transitions {
            require_state(&index, "transition", from)?;
            require_state(&index, "transition", to)?;
            if let Some(c) = symbol {
                if !self.alphabet.contains(c) {
                    return Err(ParamError::unknown("symbol", c));
                }
            }
        }
        Ok(())
    }

    fn index(&self, state: &str) -> usize {
        self.states.iter().position(|s| s == state).unwrap_or(0)
    }

    /// Arcs as `(from, symbol, to)` indices.
    fn arcs(&self) -> Vec<(usize, Option<char>, usize)> {
        self.transitions
            .iter()
            .map(|(f, c, t)| (self.index(f), *c, self.index(t)))
            .collect()
    }
}

/// Active-state membership over `states`, in state order.
fn members(active: &[bool]) -> Vec<usize> {
    (0..active.len()).filter(|&i| active[i]).collect()
}

fn closure(arcs: &[(usize, Option<char>, usize)], active: &mut [bool]) -> Vec<usize> {
    let mut stack = members(active);
    let mut added = Vec::new();
    while let Some(q) = stack.pop() {
        for &(from, symbol, to) in arcs {
            if from == q && symbol.is_none() && !active[to] {
                active[to] = true;
                added.push(to);
                stack.push(to);
            }
        }
    }
    added.sort_unstable();
    added
}

/// An NFA and the string to run it on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfaInput {
    /// The automaton.
    pub automaton: Nfa,
    /// Input string.
    pub input: String,
}

impl NfaInput {
    /// Pair an automaton with an input.
    pub fn new(automaton: Nfa, input: &str) -> Self {
        Self {
            automaton,
            input: input.to_owned(),
        }
    }
}

/// NFA acceptance engine.
///
/// The active set starts as the ε-closure of the start state. Each
/// symbol moves every active state along its matching arcs and closes
/// the result under ε-moves. The input is accepted iff the final set
/// contains an accepting state. An empty active set rejects at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NfaSimulator;

/// Verdict and active-set history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfaResult {
    /// Whether an accepting state is active at the end.
    pub accepted: bool,
    /// Active states after the last consumed symbol.
    pub final_states: Vec<String>,
    /// Active set before any input and after each symbol.
    pub history: Vec<Vec<String>>,
    /// Symbols consumed before stopping.
    pub consumed: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NfaSnapshot {
    position: usize,
    symbol: Option<char>,
    moved: Vec<String>,
    epsilon_added: Vec<String>,
    active: Vec<String>,
}

impl Engine for NfaSimulator {
    type Problem = NfaInput;

    fn name(&self) -> &str {
        "nfa"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n · |Q| · |δ|)", "O(|Q|)")
    }

    fn validate(&self, p: &NfaInput) -> Result<(), ParamError> {
        p.automaton.check()?;
        require_symbols(&p.automaton.alphabet, &p.input)
    }

    fn run(&self, p: &NfaInput, rec: &mut Recorder) -> Conclusion {
        let nfa = &p.automaton;
        let names = |ids: &[usize]| -> Vec<String> {
            ids.iter().map(|&i| nfa.states[i].clone()).collect()
        };
        let arcs = nfa.arcs();
        let n = nfa.states.len();

        let mut active = vec![false; n];
        let start = nfa.index(&nfa.start);
        active[start] = true;
        let added = closure(&arcs, &mut active);
        let current = members(&active);
        let mut history = vec![names(&current)];
        rec.record(
            format!(
                "Start set: ε-closure({}) = {}",
                nfa.start,
                set(&names(&current))
            ),
            &NfaSnapshot {
                position: 0,
                symbol: None,
                moved: vec![nfa.start.clone()],
                epsilon_added: names(&added),
                active: names(&current),
            },
        )
        .metric("active", current.len())
        .note("An NFA is in every state it could possibly be in at once");

        let mut consumed = 0;
        for (i, c) in p.input.chars().enumerate() {
            let mut next = vec![false; n];
            for &(from, symbol, to) in &arcs {
                if active[from] && symbol == Some(c) {
                    next[to] = true;
                }
            }
            let moved = members(&next);
            let added = closure(&arcs, &mut next);
            active = next;
            consumed = i + 1;
            let current = members(&active);
            history.push(names(&current));
            rec.record(
                format!(
                    "Read {c}: move to {}, close under ε to {}",
                    set(&names(&moved)),
                    set(&names(&current))
                ),
                &NfaSnapshot {
                    position: i + 1,
                    symbol: Some(c),
                    moved: names(&moved),
                    epsilon_added: names(&added),
                    active: names(&current),
                },
            )
            .metric("active", current.len());
            if current.is_empty() {
                break;
            }
        }

        let current = members(&active);
        let accepted = current
            .iter()
            .any(|&q| nfa.accepting.contains(&nfa.states[q]));
        let result = NfaResult {
            accepted,
            final_states: names(&current),
            history,
            consumed,
        };
        let total = p.input.chars().count();
        let description = if current.is_empty() && consumed < total {
            format!("No active states after {consumed} of {total} symbol(s): reject")
        } else if accepted {
            format!("Final set {} contains an accepting state: accept", set(&result.final_states))
        } else {
            format!("Final set {} has no accepting state: reject", set(&result.final_states))
        };
        rec.record(description, &result).metric("accepted", accepted);
        Conclusion::solved(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Strings over {a, b} ending in "ab".
    fn ends_with_ab() -> Nfa {
        Nfa::new(&["q0", "q1", "q2"], "ab", "q0", &["q2"])
            .with_transition("q0", 'a', "q0")
            .with_transition("q0", 'b', "q0")
            .with_transition("q0", 'a', "q1")
            .with_transition("q1", 'b', "q2")
    }

    /// a*b* with an ε-move between the two loops.
    fn a_star_b_star() -> Nfa {
        Nfa::new(&["s0", "s1"], "ab", "s0", &["s1"])
            .with_transition("s0", 'a', "s0")
            .with_epsilon("s0", "s1")
            .with_transition("s1", 'b', "s1")
    }

    fn run(nfa: Nfa, input: &str) -> (stepwise_core::Simulation, NfaResult) {
        let sim = NfaSimulator.simulate(&NfaInput::new(nfa, input));
        assert!(sim.success);
        let r = serde_json::from_value(sim.result.clone()).unwrap();
        (sim, r)
    }

    #[test]
    fn nondeterministic_suffix() {
        assert!(run(ends_with_ab(), "abab").1.accepted);
        assert!(run(ends_with_ab(), "bbab").1.accepted);
        assert!(!run(ends_with_ab(), "aba").1.accepted);
        let (_, r) = run(ends_with_ab(), "ab");
        assert_eq!(r.history[1], vec!["q0", "q1"]);
    }

    #[test]
    fn epsilon_closure_of_start() {
        let (sim, r) = run(a_star_b_star(), "");
        assert!(r.accepted);
        assert_eq!(sim.steps[0].state["epsilonAdded"], serde_json::json!(["s1"]));
    }

    #[test]
    fn empty_set_rejects_early() {
        let (sim, r) = run(a_star_b_star(), "abab");
        assert!(!r.accepted);
        assert_eq!(r.consumed, 3);
        assert!(sim.last_step().unwrap().description.starts_with("No active states"));
        assert!(run(a_star_b_star(), "aabb").1.accepted);
    }

    #[test]
    fn unknown_state_rejected() {
        let nfa = ends_with_ab().with_epsilon("q9", "q0");
        assert!(NfaSimulator.simulate(&NfaInput::new(nfa, "a")).steps.is_empty());
    }
}
