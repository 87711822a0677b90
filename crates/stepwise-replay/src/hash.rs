//! Hashing utilities for trace comparison.
//!
//! Uses FNV-1a over the canonical JSON encoding of each step. These
//! hashes are not cryptographically secure; they are fast equality
//! checks for determinism verification. Metadata is excluded because
//! wall-clock time differs between otherwise identical runs.

use stepwise_core::{Simulation, Step};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_u64(hash: u64, v: u64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

fn fold_json<T: serde::Serialize + ?Sized>(hash: u64, value: &T) -> u64 {
    match serde_json::to_vec(value) {
        Ok(bytes) => fnv1a_bytes(fnv1a_u64(hash, bytes.len() as u64), &bytes),
        Err(err) => {
            tracing::warn!(%err, "value not serializable, hashing as null");
            fnv1a_bytes(hash, b"null")
        }
    }
}

/// Hash one step: id, description, state, metrics, and notes.
pub fn step_hash(step: &Step) -> u64 {
    fold_json(FNV_OFFSET, step)
}

/// Hash a whole trace.
///
/// Folds in the outcome, every step hash in order, and the result.
/// Two runs with the same hash produced the same narrative and answer.
pub fn trace_hash(sim: &Simulation) -> u64 {
    let mut hash = fold_json(FNV_OFFSET, &sim.outcome);
    hash = fnv1a_u64(hash, sim.steps.len() as u64);
    for step in &sim.steps {
        hash = fnv1a_u64(hash, step_hash(step));
    }
    fold_json(hash, &sim.result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stepwise_core::{Complexity, Outcome, Recorder};

    fn trace(values: &[i64]) -> Simulation {
        let mut rec = Recorder::new("t");
        for v in values {
            rec.record(format!("value {v}"), v).metric("v", v);
        }
        rec.finish(
            Outcome::Solved,
            json!(values.iter().sum::<i64>()),
            Complexity::new("O(n)", "O(1)"),
            0,
            None,
        )
    }

    #[test]
    fn same_trace_same_hash() {
        assert_eq!(trace_hash(&trace(&[1, 2, 3])), trace_hash(&trace(&[1, 2, 3])));
    }

    #[test]
    fn step_order_matters() {
        assert_ne!(trace_hash(&trace(&[1, 2, 3])), trace_hash(&trace(&[3, 2, 1])));
    }

    #[test]
    fn metadata_is_ignored() {
        let a = trace(&[4, 5]);
        let mut b = a.clone();
        b.metadata.elapsed_us = 999_999;
        b.metadata.seed = Some(7);
        assert_eq!(trace_hash(&a), trace_hash(&b));
    }

    #[test]
    fn note_changes_hash() {
        let a = trace(&[4, 5]);
        let mut b = a.clone();
        b.steps[1].educational_notes.push("extra".into());
        assert_ne!(step_hash(&a.steps[1]), step_hash(&b.steps[1]));
        assert_ne!(trace_hash(&a), trace_hash(&b));
    }

    #[test]
    fn empty_input_is_offset_basis() {
        assert_eq!(fnv1a_bytes(FNV_OFFSET, &[]), FNV_OFFSET);
    }

    proptest::proptest! {
        #[test]
        fn hash_survives_json_round_trip(values in proptest::collection::vec(-1000i64..1000, 1..30)) {
            let sim = trace(&values);
            let json = serde_json::to_string(&sim).unwrap();
            let back: Simulation = serde_json::from_str(&json).unwrap();
            proptest::prop_assert_eq!(trace_hash(&back), trace_hash(&sim));
        }
    }
}
