//! JSON encode/decode for traces.
//!
//! A bare [`Simulation`] round-trips through [`to_json`] and
//! [`from_json`]. For storage, [`write_trace`] wraps it in an
//! [`Envelope`] carrying the format version and the trace hash, and
//! [`read_trace`] checks both before handing the trace back.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use stepwise_core::Simulation;

use crate::error::ReplayError;
use crate::hash::trace_hash;
use crate::FORMAT_VERSION;

/// Whitespace style of encoded JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// Indented, one field per line.
    #[default]
    Pretty,
    /// No insignificant whitespace.
    Compact,
}

/// Encode a trace as indented JSON.
pub fn to_json(sim: &Simulation) -> Result<String, ReplayError> {
    Ok(serde_json::to_string_pretty(sim)?)
}

/// Encode a trace as single-line JSON.
pub fn to_json_compact(sim: &Simulation) -> Result<String, ReplayError> {
    Ok(serde_json::to_string(sim)?)
}

/// Decode a trace from JSON in either layout.
pub fn from_json(json: &str) -> Result<Simulation, ReplayError> {
    Ok(serde_json::from_str(json)?)
}

/// A stored trace with the information needed to check it on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Envelope format version.
    pub format: u8,
    /// [`trace_hash`] of `simulation` when it was written.
    pub hash: u64,
    /// The trace.
    pub simulation: Simulation,
}

impl Envelope {
    /// Wrap a trace, computing its hash.
    pub fn seal(simulation: Simulation) -> Self {
        Self {
            format: FORMAT_VERSION,
            hash: trace_hash(&simulation),
            simulation,
        }
    }

    /// Unwrap the trace after checking the version and hash.
    pub fn open(self) -> Result<Simulation, ReplayError> {
        if self.format != FORMAT_VERSION {
            return Err(ReplayError::UnsupportedVersion { found: self.format });
        }
        let actual = trace_hash(&self.simulation);
        if actual != self.hash {
            return Err(ReplayError::HashMismatch {
                expected: self.hash,
                actual,
            });
        }
        Ok(self.simulation)
    }
}

/// Write a sealed trace to any sink.
pub fn write_trace<W: Write>(
    writer: W,
    sim: &Simulation,
    layout: Layout,
) -> Result<u64, ReplayError> {
    let envelope = Envelope::seal(sim.clone());
    match layout {
        Layout::Pretty => serde_json::to_writer_pretty(writer, &envelope)?,
        Layout::Compact => serde_json::to_writer(writer, &envelope)?,
    }
    tracing::debug!(
        engine = %sim.metadata.engine,
        steps = sim.steps.len(),
        hash = envelope.hash,
        "trace written"
    );
    Ok(envelope.hash)
}

/// Read a sealed trace from any source, verifying version and hash.
pub fn read_trace<R: Read>(reader: R) -> Result<Simulation, ReplayError> {
    let envelope: Envelope = serde_json::from_reader(reader)?;
    envelope.open()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stepwise_core::{Complexity, Outcome, Recorder};

    fn sample() -> Simulation {
        let mut rec = Recorder::new("sample");
        rec.record("open", &json!({"open": [1, 2]}))
            .metric("size", 2)
            .note("start");
        rec.record("close", &json!({"open": []}));
        rec.finish(
            Outcome::no_solution("frontier exhausted"),
            json!(null),
            Complexity::new("O(n)", "O(n)"),
            12,
            Some(9),
        )
    }

    #[test]
    fn awkward_floats_survive_storage() {
        let ratio = 21.0 / 23.0;
        let mut rec = Recorder::new("ratio");
        rec.record("ratio", &json!({"ratio": ratio, "tiny": 1e-300 / 3.0}))
            .metric("ratio", ratio);
        let sim = rec.finish(
            Outcome::Solved,
            json!({"ratio": ratio}),
            Complexity::new("O(1)", "O(1)"),
            1,
            None,
        );
        assert_eq!(from_json(&to_json_compact(&sim).unwrap()).unwrap(), sim);

        let mut buf = Vec::new();
        write_trace(&mut buf, &sim, Layout::Compact).unwrap();
        assert_eq!(read_trace(buf.as_slice()).unwrap(), sim);
    }

    #[test]
    fn pretty_and_compact_decode_alike() {
        let sim = sample();
        let pretty = to_json(&sim).unwrap();
        let compact = to_json_compact(&sim).unwrap();
        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
        assert_eq!(from_json(&pretty).unwrap(), sim);
        assert_eq!(from_json(&compact).unwrap(), sim);
    }

    #[test]
    fn sealed_trace_round_trips() {
        let sim = sample();
        let mut buf = Vec::new();
        let hash = write_trace(&mut buf, &sim, Layout::Compact).unwrap();
        assert_eq!(hash, trace_hash(&sim));
        assert_eq!(read_trace(buf.as_slice()).unwrap(), sim);
    }

    #[test]
    fn tampered_trace_is_rejected() {
        let mut envelope = Envelope::seal(sample());
        envelope.simulation.steps[0].description = "edited".into();
        assert!(matches!(
            envelope.open(),
            Err(ReplayError::HashMismatch { .. })
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut envelope = Envelope::seal(sample());
        envelope.format = FORMAT_VERSION + 1;
        assert!(matches!(
            envelope.open(),
            Err(ReplayError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(from_json("{not json"), Err(ReplayError::Json(_))));
        assert!(matches!(
            read_trace(b"[]".as_slice()),
            Err(ReplayError::Json(_))
        ));
    }
}
