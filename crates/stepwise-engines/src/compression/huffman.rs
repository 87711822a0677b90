//! Huffman coding with deterministic tie-breaking.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stepwise_core::{Complexity, Conclusion, Engine, Outcome, ParamError, Recorder};
use stepwise_stats::format::{fixed, percent};

/// A Huffman tree node with owned children.
///
/// Leaves carry a symbol; internal nodes carry both children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuffmanNode {
    /// Total frequency below this node.
    pub weight: u64,
    /// Symbol, for leaves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<char>,
    /// Subtree on the `0` edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<HuffmanNode>>,
    /// Subtree on the `1` edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<HuffmanNode>>,
}

impl HuffmanNode {
    fn leaf(symbol: char, weight: u64) -> Self {
        Self {
            weight,
            symbol: Some(symbol),
            left: None,
            right: None,
        }
    }

    fn join(left: HuffmanNode, right: HuffmanNode) -> Self {
        Self {
            weight: left.weight + right.weight,
            symbol: None,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// Code per symbol, `0` for left and `1` for right. A tree that is a
    /// single leaf gives that symbol the code `0`.
    pub fn codes(&self) -> IndexMap<char, String> {
        let mut out = IndexMap::new();
        if let Some(s) = self.symbol {
            out.insert(s, "0".to_owned());
            return out;
        }
        let mut stack: Vec<(&HuffmanNode, String)> = vec![(self, String::new())];
        while let Some((node, prefix)) = stack.pop() {
            if let Some(s) = node.symbol {
                out.insert(s, prefix);
                continue;
            }
            if let Some(r) = &node.right {
                stack.push((r, format!("{prefix}1")));
            }
            if let Some(l) = &node.left {
                stack.push((l, format!("{prefix}0")));
            }
        }
        out.sort_keys();
        out
    }

    /// Decode a bit string; `None` if it does not end on a symbol.
    pub fn decode(&self, bits: &str) -> Option<String> {
        if let Some(s) = self.symbol {
            return bits.chars().map(|b| (b == '0').then_some(s)).collect();
        }
        let mut out = String::new();
        let mut node = self;
        for b in bits.chars() {
            node = match b {
                '0' => node.left.as_deref()?,
                '1' => node.right.as_deref()?,
                _ => return None,
            };
            if let Some(s) = node.symbol {
                out.push(s);
                node = self;
            }
        }
        std::ptr::eq(node, self).then_some(out)
    }
}

/// Huffman encoder over the characters of a string.
///
/// Leaves are created in character order. Each merge takes the two
/// lightest trees, breaking ties by creation order; the first becomes
/// the left child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Huffman;

/// Encoding output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuffmanResult {
    /// Occurrences per character.
    pub frequencies: IndexMap<char, u64>,
    /// Code per character.
    pub codes: IndexMap<char, String>,
    /// The encoded bit string.
    pub encoded: String,
    /// The finished tree.
    pub tree: HuffmanNode,
    /// Input size at 8 bits per character.
    pub original_bits: u64,
    /// Length of `encoded`.
    pub encoded_bits: u64,
    /// `encoded_bits / original_bits`.
    pub compression_ratio: f64,
    /// Mean code length weighted by frequency.
    pub average_code_length: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ForestSnapshot<'a> {
    forest: Vec<&'a HuffmanNode>,
    merged: Option<[u64; 2]>,
}

fn snapshot<'a>(forest: &'a [(u64, HuffmanNode)], merged: Option<[u64; 2]>) -> ForestSnapshot<'a> {
    ForestSnapshot {
        forest: forest.iter().map(|(_, n)| n).collect(),
        merged,
    }
}

/// Position of the lightest tree, lowest creation id on ties.
fn lightest(forest: &[(u64, HuffmanNode)]) -> usize {
    (0..forest.len())
        .min_by_key(|&i| (forest[i].1.weight, forest[i].0))
        .unwrap_or(0)
}

fn describe(node: &HuffmanNode) -> String {
    match node.symbol {
        Some(s) => format!("'{s}'"),
        None => format!("node({})", node.weight),
    }
}

impl Engine for Huffman {
    type Problem = str;

    fn name(&self) -> &str {
        "huffman"
    }

    fn complexity(&self) -> Complexity {
        Complexity::new("O(n + k²) with a linear minimum scan", "O(k)")
    }

    fn validate(&self, text: &str) -> Result<(), ParamError> {
        if text.is_empty() {
            return Err(ParamError::Empty { name: "text" });
        }
        Ok(())
    }

    fn run(&self, text: &str, rec: &mut Recorder) -> Conclusion {
        let mut frequencies: IndexMap<char, u64> = IndexMap::new();
        for c in text.chars() {
            *frequencies.entry(c).or_insert(0) += 1;
        }
        frequencies.sort_keys();
        rec.record(
            format!(
                "Count {} character(s): {} distinct symbol(s)",
                text.chars().count(),
                frequencies.len()
            ),
            &frequencies,
        )
        .metric("distinct", frequencies.len());

        let mut forest: Vec<(u64, HuffmanNode)> = frequencies
            .iter()
            .enumerate()
            .map(|(id, (&c, &w))| (id as u64, HuffmanNode::leaf(c, w)))
            .collect();
        let mut next_id = forest.len() as u64;
        rec.record(
            format!("Start with {} single-leaf tree(s)", forest.len()),
            &snapshot(&forest, None),
        )
        .note("Repeatedly merging the two lightest trees puts rare symbols deepest");

        while forest.len() > 1 {
            let (id_a, a) = forest.remove(lightest(&forest));
            let (id_b, b) = forest.remove(lightest(&forest));
            let narration = format!(
                "Merge {} ({}) and {} ({}) into a node of weight {}",
                describe(&a),
                a.weight,
                describe(&b),
                b.weight,
                a.weight + b.weight
            );
            forest.push((next_id, HuffmanNode::join(a, b)));
            next_id += 1;
            rec.record(narration, &snapshot(&forest, Some([id_a, id_b])))
                .metric("trees", forest.len());
        }
        let Some((_, tree)) = forest.pop() else {
            return Conclusion::new(Outcome::no_solution("no symbols to encode"), &());
        };

        let codes = tree.codes();
        rec.record(
            format!("Read codes off the tree: {} code(s)", codes.len()),
            &codes,
        )
        .note("No code is a prefix of another, so the bit stream decodes without separators");

        let encoded: String = text
            .chars()
            .filter_map(|c| codes.get(&c).map(String::as_str))
            .collect();
        let original_bits = 8 * text.chars().count() as u64;
        let encoded_bits = encoded.len() as u64;
        let total: u64 = frequencies.values().sum();
        let average_code_length = frequencies
            .iter()
            .map(|(c, &w)| w as f64 * codes.get(c).map_or(0, String::len) as f64)
            .sum::<f64>()
            / total as f64;
        let result = HuffmanResult {
            frequencies,
            codes,
            encoded,
            tree,
            original_bits,
            encoded_bits,
            compression_ratio: encoded_bits as f64 / original_bits as f64,
            average_code_length,
        };
        rec.record(
            format!(
                "Encoded {original_bits} bits into {encoded_bits} ({} of the original), {} bits per symbol",
                percent(result.compression_ratio),
                fixed(average_code_length, 3)
            ),
            &result,
        )
        .metric("encodedBits", encoded_bits)
        .metric("compressionRatio", result.compression_ratio);
        Conclusion::solved(&result)
    }
}
