//! Token-sort similarity scoring.
//!
//! Both strings are split on whitespace, their tokens sorted with the
//! case-sensitive ordinal order of `str` (byte order of the UTF-8 encoding,
//! which equals Unicode scalar value order) and rejoined with single spaces.
//! The rejoined strings are compared with Ratcliff/Obershelp block matching:
//! the longest common block is taken, then the same is done recursively left
//! and right of it. With `L` matched characters the score is
//! `round(200 * L / (len(a) + len(b)))`, rounding half to even.
//!
//! Block matching is not symmetric in its arguments ("tide" against "diet"
//! finds one block, "diet" against "tide" finds two), so [`ratio`] always
//! compares the lexicographically smaller sequence first.

use crate::error::ScoreFault;
use serde::{Deserialize, Serialize};

/// Default length guard applied by [`Scorer`], in characters.
pub const DEFAULT_MAX_VALUE_CHARS: usize = 4096;

/// Options controlling how values are prepared before comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerOptions {
    /// Full preprocessing: drop Latin-1 supplement characters, replace
    /// anything that is not a word character with a space, lower-case and trim.
    #[serde(default)]
    pub full_process: bool,
}

/// A run of equal characters shared by both strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    /// Start in the first string
    pub a: usize,
    /// Start in the second string
    pub b: usize,
    /// Length of the block
    pub size: usize,
}

/// Calculate the token-sort ratio of two strings with default options.
///
/// # Arguments
/// * `a` - First string
/// * `b` - Second string
///
/// # Returns
/// Similarity score from 0 (nothing shared) to 100 (same tokens)
///
/// # Example
/// ```
/// use fuzzy_lookup_search::token_sort_ratio;
///
/// assert_eq!(token_sort_ratio("Alpha Beta", "Beta Alpha"), 100);
/// assert_eq!(token_sort_ratio("fuzzy was a bear", "fuzzy fuzzy was a bear"), 84);
/// ```
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let options = ScorerOptions::default();
    ratio(&prepare(a, options), &prepare(b, options))
}

/// Sort the whitespace-delimited tokens of `s` and rejoin them.
pub fn token_sort(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Preprocessing applied when [`ScorerOptions::full_process`] is set.
pub fn full_process(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| !('\u{80}'..='\u{ff}').contains(c))
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    cleaned.to_lowercase().trim().to_string()
}

/// Turn a raw value into the character sequence the ratio is computed on.
pub fn prepare(s: &str, options: ScorerOptions) -> Vec<char> {
    let sorted = if options.full_process {
        token_sort(&full_process(s))
    } else {
        token_sort(s)
    };
    sorted.chars().collect()
}

/// Similarity ratio of two prepared character sequences.
pub fn ratio(a: &[char], b: &[char]) -> u8 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let matched: usize = matching_blocks(a, b).iter().map(|m| m.size).sum();
    round_half_even(200 * matched, total).min(100) as u8
}

/// All matching blocks of `a` and `b`, ordered by position.
pub fn matching_blocks(a: &[char], b: &[char]) -> Vec<MatchingBlock> {
    let mut blocks = Vec::new();
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let block = longest_match(a, b, alo, ahi, blo, bhi);
        if block.size == 0 {
            continue;
        }
        if alo < block.a && blo < block.b {
            queue.push((alo, block.a, blo, block.b));
        }
        if block.a + block.size < ahi && block.b + block.size < bhi {
            queue.push((block.a + block.size, ahi, block.b + block.size, bhi));
        }
        blocks.push(block);
    }

    blocks.sort_unstable_by_key(|m| (m.a, m.b));
    blocks
}

/// Longest block common to `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Among blocks of equal size the one starting earliest in `a` wins, then
/// the one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> MatchingBlock {
    let mut best = MatchingBlock { a: alo, b: blo, size: 0 };
    if alo >= ahi || blo >= bhi {
        return best;
    }

    // Rolling rows: row[j - blo + 1] is the length of the block ending at (i, j)
    let width = bhi - blo + 1;
    let mut prev = vec![0usize; width];
    let mut curr = vec![0usize; width];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                curr[col] = k;
                if k > best.size {
                    best = MatchingBlock { a: i + 1 - k, b: j + 1 - k, size: k };
                }
            } else {
                curr[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}

/// `numerator / denominator` rounded to the nearest integer, ties to even.
fn round_half_even(numerator: usize, denominator: usize) -> usize {
    let quotient = numerator / denominator;
    let twice_remainder = 2 * (numerator % denominator);
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// Token-sort scorer with a length guard, used by the matching engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scorer {
    options: ScorerOptions,
    max_value_chars: usize,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(ScorerOptions::default(), DEFAULT_MAX_VALUE_CHARS)
    }
}

impl Scorer {
    /// Creates a scorer.
    pub fn new(options: ScorerOptions, max_value_chars: usize) -> Self {
        Self { options, max_value_chars }
    }

    /// Preparation options in effect.
    pub fn options(&self) -> ScorerOptions {
        self.options
    }

    /// Prepare a raw value once so it can be scored against many others.
    pub fn prepare(&self, value: &str) -> Vec<char> {
        prepare(value, self.options)
    }

    /// Score two prepared values, rejecting values over the length guard.
    pub fn score_prepared(&self, a: &[char], b: &[char]) -> Result<u8, ScoreFault> {
        for chars in [a.len(), b.len()] {
            if chars > self.max_value_chars {
                return Err(ScoreFault::ValueTooLong { chars, limit: self.max_value_chars });
            }
        }
        Ok(ratio(a, b))
    }

    /// Prepare and score two raw values.
    pub fn score(&self, a: &str, b: &str) -> Result<u8, ScoreFault> {
        self.score_prepared(&self.prepare(a), &self.prepare(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_identical() {
        assert_eq!(token_sort_ratio("hello world", "hello world"), 100);
    }

    #[test]
    fn test_reordered_tokens() {
        assert_eq!(token_sort_ratio("hello world", "world hello"), 100);
        assert_eq!(token_sort_ratio("Alpha Beta", "Beta Alpha"), 100);
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(token_sort_ratio("  new   york ", "york new"), 100);
    }

    #[test]
    fn test_case_sensitive_by_default() {
        assert!(token_sort_ratio("ACME Corp", "acme corp") < 100);
    }

    #[test]
    fn test_full_process_ignores_case_and_punctuation() {
        let scorer = Scorer::new(ScorerOptions { full_process: true }, DEFAULT_MAX_VALUE_CHARS);
        assert_eq!(scorer.score("ACME, Corp.", "corp acme"), Ok(100));
    }

    #[test]
    fn test_full_process_output() {
        assert_eq!(full_process("  Hello, World!  "), "hello  world");
        assert_eq!(full_process("snake_case"), "snake_case");
        assert_eq!(full_process("café"), "caf");
    }

    #[test]
    fn test_known_values() {
        assert_eq!(token_sort_ratio("fuzzy was a bear", "fuzzy fuzzy was a bear"), 84);
        assert_eq!(token_sort_ratio("Gamma", "Delta"), 20);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(token_sort_ratio("", ""), 100);
        assert_eq!(token_sort_ratio("   ", ""), 100);
        assert_eq!(token_sort_ratio("", "hello"), 0);
        assert_eq!(token_sort_ratio("hello", ""), 0);
    }

    #[test]
    fn test_completely_different() {
        assert_eq!(token_sort_ratio("abc", "xyz"), 0);
    }

    #[test]
    fn test_matching_blocks() {
        let blocks = matching_blocks(&chars("abxcd"), &chars("abcd"));
        assert_eq!(
            blocks,
            vec![
                MatchingBlock { a: 0, b: 0, size: 2 },
                MatchingBlock { a: 3, b: 2, size: 2 },
            ]
        );
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let block = longest_match(&chars("abab"), &chars("ab"), 0, 4, 0, 2);
        assert_eq!(block, MatchingBlock { a: 0, b: 0, size: 2 });
    }

    #[test]
    fn test_ratio_argument_order() {
        assert_eq!(ratio(&chars("tide"), &chars("diet")), 50);
        assert_eq!(ratio(&chars("diet"), &chars("tide")), 50);
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(5, 2), 2);
        assert_eq!(round_half_even(7, 2), 4);
        assert_eq!(round_half_even(10, 3), 3);
        assert_eq!(round_half_even(11, 3), 4);
    }

    #[test]
    fn test_length_guard() {
        let scorer = Scorer::new(ScorerOptions::default(), 5);
        assert_eq!(scorer.score("short", "short"), Ok(100));
        assert_eq!(
            scorer.score("much too long", "short"),
            Err(ScoreFault::ValueTooLong { chars: 13, limit: 5 })
        );
    }

    proptest! {
        #[test]
        fn prop_self_similarity(s in "\\PC{0,40}") {
            prop_assert_eq!(token_sort_ratio(&s, &s), 100);
        }

        #[test]
        fn prop_symmetry(a in "[a-z ]{0,24}", b in "[a-z ]{0,24}") {
            prop_assert_eq!(token_sort_ratio(&a, &b), token_sort_ratio(&b, &a));
        }

        #[test]
        fn prop_token_permutation(tokens in prop::collection::vec("[A-Za-z0-9]{1,8}", 1..6)) {
            let forward = tokens.join(" ");
            let reversed: Vec<&str> = tokens.iter().rev().map(String::as_str).collect();
            prop_assert_eq!(token_sort_ratio(&forward, &reversed.join("  ")), 100);
        }

        #[test]
        fn prop_score_in_range(a in "\\PC{0,30}", b in "\\PC{0,30}") {
            prop_assert!(token_sort_ratio(&a, &b) <= 100);
        }
    }
}
