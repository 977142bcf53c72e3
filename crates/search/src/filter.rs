//! Threshold filtering and per-source result limiting.

use crate::error::{Result, SearchError};
use crate::value_set::ValueSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// How many matches to keep per source value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultLimit {
    /// Keep every match that reaches the threshold
    #[default]
    Unbounded,
    /// Keep at most this many matches per source value
    PerSource(usize),
}

impl ResultLimit {
    /// `None` maps to [`ResultLimit::Unbounded`].
    pub fn from_option(limit: Option<usize>) -> Self {
        limit.map_or(ResultLimit::Unbounded, ResultLimit::PerSource)
    }

    /// Rejects a per-source limit of zero.
    pub fn validate(&self) -> Result<()> {
        match self {
            ResultLimit::PerSource(0) => Err(SearchError::invalid(
                "result limit must be a positive integer",
            )),
            _ => Ok(()),
        }
    }

    fn capacity(&self) -> Option<usize> {
        match self {
            ResultLimit::Unbounded => None,
            ResultLimit::PerSource(limit) => Some(*limit),
        }
    }
}

impl std::fmt::Display for ResultLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultLimit::Unbounded => write!(f, "unbounded"),
            ResultLimit::PerSource(limit) => write!(f, "{limit} per source"),
        }
    }
}

/// A scored pair that passed the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Position of the source value in its set
    pub source_index: usize,
    /// Position of the target value in its set
    pub target_index: usize,
    /// The source value
    pub source: String,
    /// The target value
    pub target: String,
    /// Token-sort ratio, 0 to 100
    pub score: u8,
}

/// Ordered result of a matching run.
///
/// Sorted by source position, then score descending, then target position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSet {
    source_label: String,
    target_label: String,
    records: Vec<MatchRecord>,
}

impl MatchSet {
    /// Label of the source collection.
    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    /// Label of the target collection.
    pub fn target_label(&self) -> &str {
        &self.target_label
    }

    /// Records in output order.
    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing reached the threshold.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, MatchRecord> {
        self.records.iter()
    }

    /// Consume the set, returning its records.
    pub fn into_records(self) -> Vec<MatchRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a MatchRecord;
    type IntoIter = std::slice::Iter<'a, MatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Heap entry ordered so that the worst candidate is the greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ranked {
    score: u8,
    target_index: usize,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then(self.target_index.cmp(&other.target_index))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-source top-K accumulator fed with scored pairs in any order.
///
/// The result does not depend on the order pairs are offered in, so it can
/// sit behind a channel fed by parallel workers.
#[derive(Debug)]
pub struct MatchCollector {
    threshold: u8,
    capacity: Option<usize>,
    per_source: Vec<BinaryHeap<Ranked>>,
    kept: usize,
}

impl MatchCollector {
    /// Create a collector for `sources` source values.
    pub fn new(sources: usize, threshold: u8, limit: ResultLimit) -> Self {
        Self {
            threshold,
            capacity: limit.capacity(),
            per_source: (0..sources).map(|_| BinaryHeap::new()).collect(),
            kept: 0,
        }
    }

    /// Offer one scored pair. Returns whether it currently survives.
    pub fn offer(&mut self, source_index: usize, target_index: usize, score: u8) -> bool {
        if score < self.threshold {
            return false;
        }
        let Some(heap) = self.per_source.get_mut(source_index) else {
            return false;
        };

        let entry = Ranked { score, target_index };
        heap.push(entry);
        self.kept += 1;

        if let Some(capacity) = self.capacity {
            if heap.len() > capacity {
                let evicted = heap.pop();
                self.kept -= 1;
                return evicted != Some(entry);
            }
        }
        true
    }

    /// Number of pairs currently retained.
    pub fn kept(&self) -> usize {
        self.kept
    }

    /// Resolve retained entries against the value sets, in output order.
    pub fn finish(self, source: &ValueSet, target: &ValueSet) -> MatchSet {
        let mut records = Vec::with_capacity(self.kept);

        for (source_index, heap) in self.per_source.into_iter().enumerate() {
            // Ascending in `Ranked` order is best first
            for ranked in heap.into_sorted_vec() {
                records.push(MatchRecord {
                    source_index,
                    target_index: ranked.target_index,
                    source: source.values()[source_index].clone(),
                    target: target.values()[ranked.target_index].clone(),
                    score: ranked.score,
                });
            }
        }

        MatchSet {
            source_label: source.label().to_string(),
            target_label: target.label().to_string(),
            records,
        }
    }
}
