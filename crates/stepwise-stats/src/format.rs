//! Formatting for step descriptions and educational notes.
//!
//! Numbers in narration are rendered with a fixed number of decimals so
//! traces compare byte-for-byte across runs and platforms.

use std::fmt::Display;

/// `x` with exactly `decimals` fractional digits. Non-finite values
/// render as `"NaN"`, `"∞"` or `"-∞"`.
///
/// ```
/// assert_eq!(stepwise_stats::format::fixed(3.14159, 2), "3.14");
/// assert_eq!(stepwise_stats::format::fixed(-0.0001, 2), "0.00");
/// ```
pub fn fixed(x: f64, decimals: usize) -> String {
    if x.is_nan() {
        return "NaN".to_owned();
    }
    if x.is_infinite() {
        return if x > 0.0 { "∞" } else { "-∞" }.to_owned();
    }
    let s = format!("{x:.decimals$}");
    // Avoid "-0.00" for tiny negatives.
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_owned()
    } else {
        s
    }
}

/// A fraction in `[0, 1]` as a percentage with one decimal: `0.256 -> "25.6%"`.
pub fn percent(fraction: f64) -> String {
    format!("{}%", fixed(fraction * 100.0, 1))
}

/// Items joined with `", "`.
pub fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Items rendered as a set literal: `{a, b, c}`.
pub fn set<T: Display>(items: &[T]) -> String {
    format!("{{{}}}", join(items))
}

/// Items rendered as a list literal: `[a, b, c]`.
pub fn list<T: Display>(items: &[T]) -> String {
    format!("[{}]", join(items))
}

/// A bit vector as a string of `0`/`1`.
pub fn bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Parse a string of `0`/`1`. `None` if any other character appears.
pub fn parse_bits(s: &str) -> Option<Vec<bool>> {
    s.chars()
        .map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rounds_and_strips_negative_zero() {
        assert_eq!(fixed(2.0, 3), "2.000");
        assert_eq!(fixed(1.23456, 4), "1.2346");
        assert_eq!(fixed(-1.5, 1), "-1.5");
        assert_eq!(fixed(-0.004, 2), "0.00");
        assert_eq!(fixed(f64::NAN, 2), "NaN");
        assert_eq!(fixed(f64::NEG_INFINITY, 2), "-∞");
    }

    #[test]
    fn percent_formats_one_decimal() {
        assert_eq!(percent(0.256), "25.6%");
        assert_eq!(percent(1.0), "100.0%");
    }

    #[test]
    fn collections() {
        assert_eq!(set(&["a", "b"]), "{a, b}");
        assert_eq!(list(&[1, 2, 3]), "[1, 2, 3]");
        assert_eq!(set::<u8>(&[]), "{}");
    }

    #[test]
    fn bit_strings() {
        assert_eq!(bits(&[true, false, true]), "101");
        assert_eq!(parse_bits("0110"), Some(vec![false, true, true, false]));
        assert_eq!(parse_bits("01x"), None);
        assert_eq!(parse_bits(""), Some(vec![]));
    }
}
