//! Fuzzy lookup engine.
//!
//! This crate provides:
//! - Value set normalization (exact-duplicate removal)
//! - Token-sort similarity scoring on Ratcliff/Obershelp block matching
//! - A lazy cross-product pair generator
//! - Threshold filtering and per-source top-K limiting
//! - A parallel, cancellable matching engine with deterministic output
//!
//! # Example
//!
//! ```
//! use fuzzy_lookup_search::{match_values, ResultLimit};
//!
//! let outcome = match_values(
//!     &["Alpha Beta", "Gamma"],
//!     &["Beta Alpha", "Delta"],
//!     80,
//!     ResultLimit::PerSource(5),
//! )
//! .unwrap();
//!
//! let best = &outcome.matches.records()[0];
//! assert_eq!((best.source.as_str(), best.target.as_str(), best.score), ("Alpha Beta", "Beta Alpha", 100));
//! ```

mod engine;
mod error;
mod filter;
mod fuzzy;
mod pairs;
mod value_set;

pub use engine::{
    match_values, CancellationToken, MatchOutcome, MatchParams, MatchStats, Matcher,
    ProgressObserver, MAX_THRESHOLD,
};
pub use error::{Result, ScoreFault, ScoringFailure, SearchError, SearchErrorCode};
pub use filter::{MatchCollector, MatchRecord, MatchSet, ResultLimit};
pub use fuzzy::{
    full_process, matching_blocks, ratio, token_sort, token_sort_ratio, MatchingBlock, Scorer,
    ScorerOptions, DEFAULT_MAX_VALUE_CHARS,
};
pub use pairs::{candidate_pairs, CandidatePair, CandidatePairs};
pub use value_set::ValueSet;
