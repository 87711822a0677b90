//! Run-length encoding.

use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, ParamError, Recorder};
use stepwise_stats::format::percent;

/// Run-length encoder over characters.
///
/// Output is `<count><symbol>` per run, so `aaab` becomes `3a1b`. The
/// form is ambiguous for inputs containing digits; [`RleResult::runs`]
/// is the unambiguous encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunLength;

/// A maximal run of one symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// The repeated character.
    pub symbol: char,
    /// Run length, >= 1.
    pub count: usize,
}

/// Encoding output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RleResult {
    /// Runs in order.
    pub runs: Vec<Run>,
    /// Textual encoding.
    pub encoded: String,
    /// Input length in characters.
    pub original_length: usize,
    /// `encoded` length in characters.
    pub encoded_length: usize,
    /// `encoded_length / original_length`; above 1 means expansion.
    pub compression_ratio: f64,
}

impl RleResult {
    /// Expand the runs back into text.
    pub fn decode(&self) -> String {
        self.runs
            .iter()
            .flat_map(|r| std::iter::repeat(r.symbol).take(r.count))
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSnapshot<'a> {
    position: usize,
    run: Run,
    runs: &'a [Run],
    encoded: &'a str,
}

impl Engine for RunLength {
    type Problem = str;

    fn name(&self) -> &str {
        "rle"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n)", "O(n)")
    }

    fn validate(&self, text: &str) -> Result<(), ParamError> {
        if text.is_empty() {
            return Err(ParamError::Empty { name: "text" });
        }
        Ok(())
    }

    fn run(&self, text: &str, rec: &mut Recorder) -> Conclusion {
        let chars: Vec<char> = text.chars().collect();
        let mut runs: Vec<Run> = Vec::new();
        let mut encoded = String::new();
        let mut start = 0;
        while start < chars.len() {
            let symbol = chars[start];
            let count = chars[start..].iter().take_while(|&&c| c == symbol).count();
            let run = Run { symbol, count };
            runs.push(run);
            encoded.push_str(&format!("{count}{symbol}"));
            rec.record(
                format!("Run of {count} '{symbol}' at position {start} -> {count}{symbol}"),
                &RunSnapshot {
                    position: start,
                    run,
                    runs: &runs,
                    encoded: &encoded,
                },
            )
            .metric("runs", runs.len());
            start += count;
        }

        let original_length = chars.len();
        let encoded_length = encoded.chars().count();
        let result = RleResult {
            runs,
            encoded,
            original_length,
            encoded_length,
            compression_ratio: encoded_length as f64 / original_length as f64,
        };
        let step = rec
            .record(
                format!(
                    "{original_length} character(s) -> {encoded_length} ({})",
                    percent(result.compression_ratio)
                ),
                &result,
            )
            .metric("compressionRatio", result.compression_ratio);
        if result.compression_ratio > 1.0 {
            step.note("Short runs cost two characters each, so this input grew");
        }
        Conclusion::solved(&result)
    }
}
