//! Finite automata: deterministic and ε-nondeterministic acceptance.

pub mod dfa;
pub mod nfa;

use indexmap::IndexMap;
use stepwise_core::ParamError;

pub use dfa::{Dfa, DfaInput, DfaResult, DfaSimulator};
pub use nfa::{Nfa, NfaInput, NfaResult, NfaSimulator};

/// State name to index, rejecting an empty or duplicated state list.
pub(crate) fn index_states(states: &[String]) -> Result<IndexMap<&str, usize>, ParamError> {
    if states.is_empty() {
        return Err(ParamError::Empty { name: "states" });
    }
    let mut index = IndexMap::new();
    for (i, s) in states.iter().enumerate() {
        if index.insert(s.as_str(), i).is_some() {
            return Err(ParamError::inconsistent(format!("state {s} is listed twice")));
        }
    }
    Ok(index)
}

pub(crate) fn require_state(
    index: &IndexMap<&str, usize>,
    name: &'static str,
    state: &str,
) -> Result<usize, ParamError> {
    index
        .get(state)
        .copied()
        .ok_or_else(|| ParamError::unknown(name, state))
}

pub(crate) fn require_symbols(alphabet: &[char], input: &str) -> Result<(), ParamError> {
    match input.chars().find(|c| !alphabet.contains(c)) {
        Some(c) => Err(ParamError::out_of_range(
            "input",
            format!("'{c}'"),
            format!("a symbol of {{{}}}", stepwise_stats::format::join(alphabet)),
        )),
        None => Ok(()),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
