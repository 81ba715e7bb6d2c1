//! Edit-distance similarity metrics
//!
//! All scores are integers in `0..=100`. Lengths are counted in Unicode
//! scalar values, not bytes.

/// Similarity based on insertions and deletions: `2 * LCS / (len(a) + len(b))`.
///
/// Two empty strings are identical (100); one empty string scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// [`ratio`] after sorting each string's whitespace-separated tokens, so that
/// word order does not matter.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Best [`ratio`] between the shorter string and any window of the longer
/// string with the same length.
///
/// Returns 0 when either string is empty.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if shorter.is_empty() {
        return 0;
    }

    let mut best = 0;
    for window in longer.windows(shorter.len()) {
        best = best.max(ratio_chars(&shorter, window));
        if best == 100 {
            break;
        }
    }
    best
}

fn ratio_chars(a: &[char], b: &[char]) -> u8 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }

    let common = longest_common_subsequence(a, b);
    (200.0 * common as f64 / total as f64).round() as u8
}

/// Length of the longest common subsequence, two rows of DP.
fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if inner.is_empty() {
        return 0;
    }

    let mut previous = vec![0usize; inner.len() + 1];
    let mut current = vec![0usize; inner.len() + 1];

    for &x in outer {
        for (j, &y) in inner.iter().enumerate() {
            current[j + 1] = if x == y {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[inner.len()]
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
