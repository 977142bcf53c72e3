//! Matching engine: normalize, generate pairs, score, filter and limit.
//!
//! Scoring runs on a worker pool fed by the pair generator. Workers send
//! their results over a channel to a single aggregation thread that owns
//! the per-source accumulators, so the only shared state is the pair
//! cursor (locked by `par_bridge`) and the channel.

use crate::error::{Result, ScoringFailure, SearchError};
use crate::filter::{MatchCollector, MatchSet, ResultLimit};
use crate::fuzzy::{Scorer, ScorerOptions, DEFAULT_MAX_VALUE_CHARS};
use crate::pairs::{candidate_pairs, CandidatePair};
use crate::value_set::ValueSet;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Highest accepted score threshold.
pub const MAX_THRESHOLD: u32 = 100;

/// Threshold and limit of a matching run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchParams {
    /// Minimum score a pair needs to be kept (inclusive)
    pub threshold: u32,
    /// Per-source cap on kept pairs
    pub limit: ResultLimit,
}

impl MatchParams {
    /// Creates parameters without validating them.
    pub fn new(threshold: u32, limit: ResultLimit) -> Self {
        Self { threshold, limit }
    }

    /// Checks both parameters, returning the threshold as a score.
    pub fn validate(&self) -> Result<u8> {
        if self.threshold > MAX_THRESHOLD {
            return Err(SearchError::invalid(format!(
                "score threshold must be between 0 and {MAX_THRESHOLD}, got {}",
                self.threshold
            )));
        }
        self.limit.validate()?;
        Ok(self.threshold as u8)
    }
}

/// Cooperative cancellation flag shared between a caller and a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop at the next pair boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receives progress from the scoring workers.
///
/// `on_scored` is called from worker threads, possibly concurrently.
pub trait ProgressObserver: Send + Sync {
    /// Scoring is about to start on `total` pairs.
    fn on_start(&self, _total: u64) {}

    /// `count` more pairs have been scored.
    fn on_scored(&self, count: u64);

    /// Scoring ended, completed or not.
    fn on_finish(&self) {}
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// Size of the cross product
    pub pairs_total: u64,
    /// Pairs that went through the scorer
    pub pairs_scored: u64,
    /// Pairs kept after filtering and limiting
    pub pairs_kept: usize,
    /// Pairs skipped because of a scoring failure
    pub pairs_failed: usize,
    /// Wall-clock time of the scoring phase
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    /// Kept matches in deterministic order
    pub matches: MatchSet,
    /// Pairs that were skipped, in pair order
    pub failures: Vec<ScoringFailure>,
    /// Run counters
    pub stats: MatchStats,
}

impl MatchOutcome {
    /// True when every candidate pair was scored.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A configured matching engine.
///
/// # Example
/// ```
/// use fuzzy_lookup_search::{Matcher, ResultLimit};
///
/// let outcome = Matcher::new(80, ResultLimit::PerSource(5))
///     .run(&["Alpha Beta", "Gamma"], &["Beta Alpha", "Delta"])
///     .unwrap();
///
/// assert_eq!(outcome.matches.len(), 1);
/// assert_eq!(outcome.matches.records()[0].score, 100);
/// ```
#[derive(Clone)]
pub struct Matcher {
    params: MatchParams,
    scorer_options: ScorerOptions,
    max_value_chars: usize,
    workers: usize,
    cancel: CancellationToken,
    progress: Option<Arc<dyn ProgressObserver>>,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("params", &self.params)
            .field("scorer_options", &self.scorer_options)
            .field("max_value_chars", &self.max_value_chars)
            .field("workers", &self.workers)
            .field("has_progress", &self.progress.is_some())
            .finish()
    }
}

impl Matcher {
    /// Creates an engine with default options.
    pub fn new(threshold: u32, limit: ResultLimit) -> Self {
        Self::with_params(MatchParams::new(threshold, limit))
    }

    /// Creates an engine from prepared parameters.
    pub fn with_params(params: MatchParams) -> Self {
        Self {
            params,
            scorer_options: ScorerOptions::default(),
            max_value_chars: DEFAULT_MAX_VALUE_CHARS,
            workers: 0,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Number of scoring threads; 0 uses one per logical CPU.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Value preparation options.
    pub fn scorer_options(mut self, options: ScorerOptions) -> Self {
        self.scorer_options = options;
        self
    }

    /// Longest prepared value the scorer accepts, in characters.
    pub fn max_value_chars(mut self, max: usize) -> Self {
        self.max_value_chars = max;
        self
    }

    /// Token checked by the workers at every pair boundary.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Observer notified as pairs are scored.
    pub fn progress(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = Some(observer);
        self
    }

    /// Parameters of this engine.
    pub fn params(&self) -> MatchParams {
        self.params
    }

    /// Normalize two raw collections and match them.
    ///
    /// The collections are labelled `source` and `target`.
    pub fn run<S, T>(&self, source: &[S], target: &[T]) -> Result<MatchOutcome>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let threshold = self.params.validate()?;
        let source = ValueSet::from_raw("source", source)?;
        let target = ValueSet::from_raw("target", target)?;
        self.execute(&source, &target, threshold)
    }

    /// Match two already normalized value sets.
    pub fn run_sets(&self, source: &ValueSet, target: &ValueSet) -> Result<MatchOutcome> {
        let threshold = self.params.validate()?;
        self.execute(source, target, threshold)
    }

    fn execute(&self, source: &ValueSet, target: &ValueSet, threshold: u8) -> Result<MatchOutcome> {
        if self.max_value_chars == 0 {
            return Err(SearchError::invalid("max_value_chars must be positive"));
        }

        let scorer = Scorer::new(self.scorer_options, self.max_value_chars);
        let job = ScoringJob {
            scorer,
            source_prepared: source.values().iter().map(|v| scorer.prepare(v)).collect(),
            target_prepared: target.values().iter().map(|v| scorer.prepare(v)).collect(),
            cancel: &self.cancel,
            progress: self.progress.as_deref(),
        };

        let pairs_total = (source.len() * target.len()) as u64;
        tracing::debug!(
            source = source.label(),
            target = target.label(),
            source_values = source.len(),
            target_values = target.len(),
            pairs = pairs_total,
            threshold,
            limit = %self.params.limit,
            "Starting fuzzy match"
        );

        if let Some(progress) = job.progress {
            progress.on_start(pairs_total);
        }
        let started = Instant::now();
        let collector = MatchCollector::new(source.len(), threshold, self.params.limit);
        let aggregate = self.score_all(&job, source, target, collector);
        if let Some(progress) = job.progress {
            progress.on_finish();
        }
        let aggregate = aggregate?;
        let elapsed = started.elapsed();

        if aggregate.scored < pairs_total && self.cancel.is_cancelled() {
            tracing::info!(scored = aggregate.scored, total = pairs_total, "Fuzzy match cancelled");
            return Err(SearchError::Cancelled {
                scored: aggregate.scored,
                total: pairs_total,
            });
        }

        let Aggregate { collector, mut failures, scored } = aggregate;
        failures.sort_by_key(|f| (f.source_index, f.target_index));
        let matches = collector.finish(source, target);

        let stats = MatchStats {
            pairs_total,
            pairs_scored: scored,
            pairs_kept: matches.len(),
            pairs_failed: failures.len(),
            elapsed,
        };
        tracing::info!(
            pairs = stats.pairs_total,
            kept = stats.pairs_kept,
            failed = stats.pairs_failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "Fuzzy match complete"
        );

        Ok(MatchOutcome { matches, failures, stats })
    }

    #[cfg(feature = "parallel")]
    fn score_all(
        &self,
        job: &ScoringJob<'_>,
        source: &ValueSet,
        target: &ValueSet,
        collector: MatchCollector,
    ) -> Result<Aggregate> {
        use rayon::prelude::*;
        use std::sync::mpsc;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("fuzzy-worker-{i}"))
            .build()
            .map_err(|e| SearchError::WorkerPool(e.to_string()))?;
        tracing::debug!(workers = pool.current_num_threads(), "Worker pool ready");

        let (tx, rx) = mpsc::channel::<Scored>();

        std::thread::scope(|scope| {
            let aggregator = scope.spawn(move || {
                let mut aggregate = Aggregate::new(collector);
                for message in rx {
                    aggregate.accept(message);
                }
                aggregate
            });

            // Err only means "stop pulling pairs"; the reason is read from the token
            let _ = pool.install(|| {
                candidate_pairs(source, target)
                    .par_bridge()
                    .try_for_each_with(tx, |tx, pair| {
                        if job.cancel.is_cancelled() {
                            return Err(());
                        }
                        tx.send(job.score(&pair)).map_err(|_| ())
                    })
            });

            aggregator
                .join()
                .map_err(|_| SearchError::WorkerPool("aggregation thread panicked".into()))
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn score_all(
        &self,
        job: &ScoringJob<'_>,
        source: &ValueSet,
        target: &ValueSet,
        collector: MatchCollector,
    ) -> Result<Aggregate> {
        let mut aggregate = Aggregate::new(collector);
        for pair in candidate_pairs(source, target) {
            if job.cancel.is_cancelled() {
                break;
            }
            aggregate.accept(job.score(&pair));
        }
        Ok(aggregate)
    }
}

/// Match two raw collections with default engine options.
///
/// # Errors
/// [`SearchError::InvalidParameter`] for a threshold above 100 or a limit of
/// zero, [`SearchError::EmptyInput`] when either collection is empty.
pub fn match_values<S, T>(
    source: &[S],
    target: &[T],
    threshold: u32,
    limit: ResultLimit,
) -> Result<MatchOutcome>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    Matcher::new(threshold, limit).run(source, target)
}

/// Read-only state shared by the scoring workers.
struct ScoringJob<'a> {
    scorer: Scorer,
    source_prepared: Vec<Vec<char>>,
    target_prepared: Vec<Vec<char>>,
    cancel: &'a CancellationToken,
    progress: Option<&'a dyn ProgressObserver>,
}

impl ScoringJob<'_> {
    fn score(&self, pair: &CandidatePair<'_>) -> Scored {
        let result = self.scorer.score_prepared(
            &self.source_prepared[pair.source_index],
            &self.target_prepared[pair.target_index],
        );
        if let Some(progress) = self.progress {
            progress.on_scored(1);
        }

        match result {
            Ok(score) => Scored::Score {
                source_index: pair.source_index,
                target_index: pair.target_index,
                score,
            },
            Err(fault) => Scored::Fault(ScoringFailure {
                source_index: pair.source_index,
                target_index: pair.target_index,
                source_value: pair.source.to_string(),
                target_value: pair.target.to_string(),
                reason: fault.to_string(),
            }),
        }
    }
}

/// Message from a worker to the aggregation stage.
enum Scored {
    Score {
        source_index: usize,
        target_index: usize,
        score: u8,
    },
    Fault(ScoringFailure),
}

struct Aggregate {
    collector: MatchCollector,
    failures: Vec<ScoringFailure>,
    scored: u64,
}

impl Aggregate {
    fn new(collector: MatchCollector) -> Self {
        Self {
            collector,
            failures: Vec::new(),
            scored: 0,
        }
    }

    fn accept(&mut self, message: Scored) {
        self.scored += 1;
        match message {
            Scored::Score { source_index, target_index, score } => {
                self.collector.offer(source_index, target_index, score);
            }
            Scored::Fault(failure) => {
                tracing::warn!(
                    source = %failure.source_value,
                    target = %failure.target_value,
                    reason = %failure.reason,
                    "Skipping pair that could not be scored"
                );
                self.failures.push(failure);
            }
        }
    }
}
