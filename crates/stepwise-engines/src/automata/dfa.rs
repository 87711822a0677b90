//! Deterministic finite automaton simulation.

use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, Outcome, ParamError, Recorder};

use super::{index_states, require_state, require_symbols, to_strings};

/// A DFA definition. The transition function must be total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dfa {
    /// State names.
    pub states: Vec<String>,
    /// Input symbols.
    pub alphabet: Vec<char>,
    /// Start state.
    pub start: String,
    /// Accepting states.
    pub accepting: Vec<String>,
    /// `(from, symbol, to)` triples.
    pub transitions: Vec<(String, char, String)>,
}

impl Dfa {
    /// A DFA with no transitions yet.
    pub fn new(states: &[&str], alphabet: &str, start: &str, accepting: &[&str]) -> Self {
        Self {
            states: to_strings(states),
            alphabet: alphabet.chars().collect(),
            start: start.to_owned(),
            accepting: to_strings(accepting),
            transitions: Vec::new(),
        }
    }

    /// Add `δ(from, symbol) = to`.
    pub fn with_transition(mut self, from: &str, symbol: char, to: &str) -> Self {
        self.transitions
            .push((from.to_owned(), symbol, to.to_owned()));
        self
    }

    /// Dense table `[state][symbol] -> state`, checking the definition.
    fn table(&self) -> Result<Vec<Vec<usize>>, ParamError> {
        let index = index_states(&self.states)?;
        if self.alphabet.is_empty() {
            return Err(ParamError::Empty { name: "alphabet" });
        }
        require_state(&index, "start", &self.start)?;
        for s in &self.accepting {
            require_state(&index, "accepting", s)?;
        }
        let k = self.alphabet.len();
        let mut table: Vec<Vec<Option<usize>>> = vec![vec![None; k]; self.states.len()];
        for (from, symbol, to) in &self.transitions {
            let f = require_state(&index, "transition", from)?;
            let t = require_state(&index, "transition", to)?;
            let a = self
                .alphabet
                .iter()
                .position(|c| c == symbol)
                .ok_or_else(|| ParamError::unknown("symbol", symbol))?;
            if table[f][a].replace(t).is_some() {
                return Err(ParamError::inconsistent(format!(
                    "δ({from}, {symbol}) is defined twice"
                )));
            }
        }
        table
            .into_iter()
            .enumerate()
            .map(|(q, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(a, t)| {
                        t.ok_or_else(|| {
                            ParamError::inconsistent(format!(
                                "δ({}, {}) is undefined; the transition function must be total",
                                self.states[q], self.alphabet[a]
                            ))
                        })
                    })
                    .collect::<Result<Vec<usize>, ParamError>>()
            })
            .collect()
    }
}

/// A DFA and the string to run it on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaInput {
    /// The automaton.
    pub automaton: Dfa,
    /// Input string.
    pub input: String,
}

impl DfaInput {
    /// Pair an automaton with an input.
    pub fn new(automaton: Dfa, input: &str) -> Self {
        Self {
            automaton,
            input: input.to_owned(),
        }
    }
}

/// DFA acceptance engine. One step per consumed symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DfaSimulator;

/// Verdict and state path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DfaResult {
    /// Whether the final state accepts.
    pub accepted: bool,
    /// State after the last symbol.
    pub final_state: String,
    /// States visited, start first.
    pub path: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DfaSnapshot<'a> {
    current: &'a str,
    position: usize,
    consumed: String,
    remaining: String,
}

impl Engine for DfaSimulator {
    type Problem = DfaInput;

    fn name(&self) -> &str {
        "dfa"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n)", "O(|Q| |Σ|)")
    }

    fn validate(&self, p: &DfaInput) -> Result<(), ParamError> {
        p.automaton.table()?;
        require_symbols(&p.automaton.alphabet, &p.input)
    }

    fn run(&self, p: &DfaInput, rec: &mut Recorder) -> Conclusion {
        let dfa = &p.automaton;
        let table = match dfa.table() {
            Ok(t) => t,
            Err(err) => {
                rec.record(format!("Transition table is unusable: {err}"), &());
                return Conclusion::new(Outcome::no_solution(err.to_string()), &());
            }
        };
        let symbols: Vec<char> = p.input.chars().collect();
        let mut q = dfa.states.iter().position(|s| *s == dfa.start).unwrap_or(0);
        let mut path = vec![dfa.states[q].clone()];
        rec.record(
            format!("Start in {} with input \"{}\"", dfa.start, p.input),
            &DfaSnapshot {
                current: &dfa.states[q],
                position: 0,
                consumed: String::new(),
                remaining: p.input.clone(),
            },
        )
        .metric("length", symbols.len())
        .note("A DFA has exactly one move for every state and symbol");

        for (i, &c) in symbols.iter().enumerate() {
            let a = dfa.alphabet.iter().position(|&x| x == c).unwrap_or(0);
            let from = q;
            q = table[q][a];
            path.push(dfa.states[q].clone());
            rec.record(
                format!("δ({}, {c}) = {}", dfa.states[from], dfa.states[q]),
                &DfaSnapshot {
                    current: &dfa.states[q],
                    position: i + 1,
                    consumed: symbols[..=i].iter().collect(),
                    remaining: symbols[i + 1..].iter().collect(),
                },
            )
            .metric("position", i + 1);
        }

        let final_state = dfa.states[q].clone();
        let accepted = dfa.accepting.contains(&final_state);
        let result = DfaResult {
            accepted,
            final_state,
            path,
        };
        rec.record(
            format!(
                "Input consumed in {}: {}",
                result.final_state,
                if accepted { "accept" } else { "reject" }
            ),
            &result,
        )
        .metric("accepted", accepted);
        Conclusion::solved(&result)
    }
}
