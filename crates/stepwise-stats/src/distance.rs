//! Distances between points and between bit strings.
//!
//! Vector functions compare the common prefix when lengths differ.

/// Squared Euclidean distance.
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Euclidean (L2) distance.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Manhattan (L1) distance.
pub fn manhattan(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// Chebyshev (L∞) distance.
pub fn chebyshev(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
}

/// Number of positions at which `a` and `b` differ, counting any length
/// difference as mismatches.
pub fn hamming<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let differing = a.iter().zip(b).filter(|(x, y)| x != y).count();
    differing + a.len().abs_diff(b.len())
}

/// Mean Hamming distance over all unordered pairs. Zero for fewer than
/// two members.
pub fn mean_pairwise_hamming<T: PartialEq>(members: &[Vec<T>]) -> f64 {
    let n = members.len();
    if n < 2 {
        return 0.0;
    }
    let mut total = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            total += hamming(&members[i], &members[j]);
        }
    }
    total as f64 / (n * (n - 1) / 2) as f64
}
