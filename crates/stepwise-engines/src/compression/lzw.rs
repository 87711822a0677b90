//! LZW dictionary compression over bytes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};
use stepwise_stats::format::percent;

/// Dictionary capacity of 12-bit codes.
pub const MAX_DICTIONARY: usize = 4096;

/// Fixed output code width.
pub const CODE_BITS: u64 = 12;

/// LZW encoder.
///
/// The dictionary starts with the 256 single bytes. Each emitted code
/// adds the current phrase plus the next byte, until the dictionary
/// holds [`MAX_DICTIONARY`] entries; after that it is frozen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lzw {
    /// Dictionary size limit, `257..=4096`.
    pub max_dictionary: usize,
}

impl Default for Lzw {
    fn default() -> Self {
        Self {
            max_dictionary: MAX_DICTIONARY,
        }
    }
}

/// A dictionary entry added during encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Assigned code.
    pub code: u32,
    /// Phrase, lossily shown as UTF-8.
    pub phrase: String,
}

/// Encoding output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LzwResult {
    /// Emitted codes.
    pub codes: Vec<u32>,
    /// Entries added beyond the initial 256.
    pub added: Vec<Entry>,
    /// Input size in bits.
    pub original_bits: u64,
    /// `codes.len() * 12`.
    pub encoded_bits: u64,
    /// `encoded_bits / original_bits`.
    pub compression_ratio: f64,
}

/// Rebuild the input from codes produced with a dictionary limit of
/// `max_dictionary`. `None` on an invalid code.
pub fn decode(codes: &[u32], max_dictionary: usize) -> Option<Vec<u8>> {
    let mut dict: Vec<Vec<u8>> = (0..=255u8).map(|b| vec![b]).collect();
    let mut out = Vec::new();
    let mut prev: Option<Vec<u8>> = None;
    for &code in codes {
        let code = code as usize;
        let entry = match (dict.get(code), &prev) {
            (Some(e), _) => e.clone(),
            (None, Some(p)) if code == dict.len() => {
                let mut e = p.clone();
                e.push(p[0]);
                e
            }
            _ => return None,
        };
        out.extend_from_slice(&entry);
        if let Some(mut p) = prev.take() {
            if dict.len() < max_dictionary {
                p.push(entry[0]);
                dict.push(p);
            }
        }
        prev = Some(entry);
    }
    Some(out)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LzwSnapshot<'a> {
    phrase: String,
    next: Option<String>,
    output: &'a [u32],
    added: Option<&'a Entry>,
    dictionary_size: usize,
}

fn show(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl Engine for Lzw {
    type Problem = [u8];

    fn name(&self) -> &str {
        "lzw"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n) dictionary lookups", "O(d)")
    }

    fn validate(&self, input: &[u8]) -> Result<(), ParamError> {
        if !(257..=MAX_DICTIONARY).contains(&self.max_dictionary) {
            return Err(ParamError::out_of_range(
                "max_dictionary",
                self.max_dictionary,
                format!("257..={MAX_DICTIONARY}"),
            ));
        }
        if input.is_empty() {
            return Err(ParamError::Empty { name: "input" });
        }
        Ok(())
    }

    fn run(&self, input: &[u8], rec: &mut Recorder) -> Conclusion {
        let mut dict: IndexMap<Vec<u8>, u32> = (0..=255u8).map(|b| (vec![b], u32::from(b))).collect();
        let mut codes: Vec<u32> = Vec::new();
        let mut added: Vec<Entry> = Vec::new();
        rec.record(
            format!("Dictionary starts with 256 single-byte entries; {} byte(s) to encode", input.len()),
            &LzwSnapshot {
                phrase: String::new(),
                next: None,
                output: &codes,
                added: None,
                dictionary_size: dict.len(),
            },
        )
        .note("Encoder and decoder grow identical dictionaries, so the dictionary is never transmitted");

        let mut phrase: Vec<u8> = vec![input[0]];
        let mut frozen_noted = false;
        for &byte in &input[1..] {
            let mut extended = phrase.clone();
            extended.push(byte);
            if dict.contains_key(&extended) {
                phrase = extended;
                continue;
            }
            let code = dict.get(&phrase).copied().unwrap_or(0);
            codes.push(code);
            let entry = (dict.len() < self.max_dictionary).then(|| {
                let code = dict.len() as u32;
                dict.insert(extended.clone(), code);
                Entry {
                    code,
                    phrase: show(&extended),
                }
            });
            let description = match &entry {
                Some(e) => format!(
                    "Emit {code} for \"{}\"; add \"{}\" as {}",
                    show(&phrase),
                    e.phrase,
                    e.code
                ),
                None => format!("Emit {code} for \"{}\"; dictionary full", show(&phrase)),
            };
            let step = rec
                .record(
                    description,
                    &LzwSnapshot {
                        phrase: show(&phrase),
                        next: Some(show(&[byte])),
                        output: &codes,
                        added: entry.as_ref(),
                        dictionary_size: dict.len(),
                    },
                )
                .metric("dictionarySize", dict.len())
                .metric("codes", codes.len());
            if entry.is_none() && !frozen_noted {
                frozen_noted = true;
                step.note("The dictionary is full and stays frozen from here on");
            }
            added.extend(entry);
            phrase = vec![byte];
        }
        let code = dict.get(&phrase).copied().unwrap_or(0);
        codes.push(code);
        rec.record(
            format!("End of input: emit {code} for \"{}\"", show(&phrase)),
            &LzwSnapshot {
                phrase: show(&phrase),
                next: None,
                output: &codes,
                added: None,
                dictionary_size: dict.len(),
            },
        );

        let original_bits = 8 * input.len() as u64;
        let encoded_bits = CODE_BITS * codes.len() as u64;
        let result = LzwResult {
            codes,
            added,
            original_bits,
            encoded_bits,
            compression_ratio: encoded_bits as f64 / original_bits as f64,
        };
        rec.record(
            format!(
                "{} code(s) of {CODE_BITS} bits: {encoded_bits} bits vs {original_bits} ({})",
                result.codes.len(),
                percent(result.compression_ratio)
            ),
            &result,
        )
        .metric("compressionRatio", result.compression_ratio);
        Conclusion::solved(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode(input: &[u8]) -> LzwResult {
        serde_json::from_value(Lzw::default().simulate(input).result).unwrap()
    }

    #[test]
    fn classic_example() {
        let r = encode(b"TOBEORNOTTOBEORTOBEORNOT");
        assert_eq!(
            r.codes,
            vec![84, 79, 66, 69, 79, 82, 78, 79, 84, 256, 258, 260, 265, 259, 261, 263]
        );
        assert_eq!(r.added[0].phrase, "TO");
    }

    #[test]
    fn repeated_byte_uses_pending_code() {
        let r = encode(b"aaaaaaa");
        assert_eq!(r.codes, vec![97, 256, 257, 97]);
        assert_eq!(decode(&r.codes, MAX_DICTIONARY).unwrap(), b"aaaaaaa");
    }

    #[test]
    fn small_dictionary_freezes() {
        let lzw = Lzw { max_dictionary: 257 };
        let sim = lzw.simulate(b"abababab".as_slice());
        let r: LzwResult = serde_json::from_value(sim.result.clone()).unwrap();
        assert_eq!(r.added.len(), 1);
        assert_eq!(decode(&r.codes, 257).unwrap(), b"abababab");
        assert!(sim.steps.iter().any(|s| s.description.ends_with("dictionary full")));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(Lzw::default().simulate(b"".as_slice()).steps.is_empty());
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(input in proptest::collection::vec(0u8..4, 1..200)) {
            let r = encode(&input);
            prop_assert_eq!(decode(&r.codes, MAX_DICTIONARY), Some(input));
        }
    }
}
