//! # Fuzzy Matching Module
//!
//! Approximate string comparison used by brand resolution to tolerate
//! misspellings and phrasing variation (e.g. "chobni" for "chobani").
//!
//! ## Features
//!
//! - Classic Levenshtein edit distance (insertion, deletion, substitution,
//!   each cost 1) over Unicode scalar values
//! - Bounded close-match check for threshold-based acceptance
//!
//! Inputs are expected to be normalized (lower-cased, trimmed) by the
//! caller; the functions themselves are pure and symmetric.

/// Compute the Levenshtein edit distance between two strings.
///
/// Operates on characters, not bytes, so accented brand names compare
/// correctly. Runs in O(|a|·|b|) time and O(min(|a|,|b|)) space.
///
/// # Examples
///
/// ```rust
/// use nutriparse::fuzzy::levenshtein;
///
/// assert_eq!(levenshtein("chobani", "chobani"), 0);
/// assert_eq!(levenshtein("chobni", "chobani"), 1);
/// assert_eq!(levenshtein("", "abc"), 3);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    let (short, long): (Vec<char>, Vec<char>) = {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        if a.len() <= b.len() {
            (a, b)
        } else {
            (b, a)
        }
    };

    if short.is_empty() {
        return long.len();
    }

    // Single-row DP over the shorter string.
    let mut row: Vec<usize> = (0..=short.len()).collect();

    for (j, lc) in long.iter().enumerate() {
        let mut previous_diagonal = row[0];
        row[0] = j + 1;

        for (i, sc) in short.iter().enumerate() {
            let substitution_cost = if sc == lc { 0 } else { 1 };
            let next = (row[i] + 1)
                .min(row[i + 1] + 1)
                .min(previous_diagonal + substitution_cost);
            previous_diagonal = row[i + 1];
            row[i + 1] = next;
        }
    }

    row[short.len()]
}

/// Check whether two strings are within `max_distance` edits of each other.
///
/// # Examples
///
/// ```rust
/// use nutriparse::fuzzy::is_close_match;
///
/// assert!(is_close_match("quakr", "quaker", 2));
/// assert!(!is_close_match("quinoa", "quaker", 2));
/// ```
pub fn is_close_match(a: &str, b: &str, max_distance: usize) -> bool {
    levenshtein(a, b) <= max_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        for s in ["", "a", "chobani", "greek yogurt"] {
            assert_eq!(levenshtein(s, s), 0);
        }
    }

    #[test]
    fn test_empty_string_distance() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", ""), 0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("kitten", "sitting"),
            ("chobni", "chobani"),
            ("quaker", "quacker"),
            ("", "fage"),
        ];
        for (a, b) in pairs {
            assert_eq!(levenshtein(a, b), levenshtein(b, a));
        }
    }

    #[test]
    fn test_known_distances() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("chobni", "chobani"), 1);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn test_unicode_chars() {
        // One substitution, not a byte-level mess.
        assert_eq!(levenshtein("lärabar", "larabar"), 1);
    }

    #[test]
    fn test_close_match_threshold() {
        assert!(is_close_match("chobni", "chobani", 2));
        assert!(is_close_match("chobani", "chobani", 0));
        assert!(!is_close_match("yoplait", "quaker", 2));
    }
}
