//! Candidate pair generation.

use crate::value_set::ValueSet;

/// One (source, target) combination, identified by set positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePair<'a> {
    /// Position of the source value in its set
    pub source_index: usize,
    /// Position of the target value in its set
    pub target_index: usize,
    /// The source value
    pub source: &'a str,
    /// The target value
    pub target: &'a str,
}

/// Lazy cross product of two value sets.
///
/// Pairs come out source-major: every target for the first source, then
/// every target for the second, and so on. Nothing is materialized; the
/// iterator only holds a cursor. Cloning it restarts from that cursor.
#[derive(Debug, Clone)]
pub struct CandidatePairs<'a> {
    source: &'a ValueSet,
    target: &'a ValueSet,
    cursor: usize,
    total: usize,
}

/// Build the pair generator for `source` × `target`.
///
/// # Example
/// ```
/// use fuzzy_lookup_search::{candidate_pairs, ValueSet};
///
/// let source = ValueSet::from_raw("s", ["a", "b", "c"]).unwrap();
/// let target = ValueSet::from_raw("t", ["w", "x", "y", "z"]).unwrap();
/// assert_eq!(candidate_pairs(&source, &target).count(), 12);
/// ```
pub fn candidate_pairs<'a>(source: &'a ValueSet, target: &'a ValueSet) -> CandidatePairs<'a> {
    CandidatePairs {
        source,
        target,
        cursor: 0,
        total: source.len() * target.len(),
    }
}

impl<'a> CandidatePairs<'a> {
    /// Size of the full cross product, independent of the cursor.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl<'a> Iterator for CandidatePairs<'a> {
    type Item = CandidatePair<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.total {
            return None;
        }
        let width = self.target.len();
        let source_index = self.cursor / width;
        let target_index = self.cursor % width;
        self.cursor += 1;

        Some(CandidatePair {
            source_index,
            target_index,
            source: &self.source.values()[source_index],
            target: &self.target.values()[target_index],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.cursor;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CandidatePairs<'_> {}

impl std::iter::FusedIterator for CandidatePairs<'_> {}
