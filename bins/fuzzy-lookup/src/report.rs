//! Run summary, printed as status lines or JSON

use crate::{Cli, Format};
use fuzzy_lookup_cli::output::{format_count, format_duration, format_number, Status};
use fuzzy_lookup_core::config::ConfigSchema;
use fuzzy_lookup_search::{MatchOutcome, MatchStats, ResultLimit, ScoringFailure, ValueSet};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

/// Failures listed individually in text mode before the rest are summarized
const SHOWN_FAILURES: usize = 5;

/// What a finished run produced
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub session_id: String,
    pub output: PathBuf,
    pub source: CollectionSummary,
    pub target: CollectionSummary,
    pub threshold: u32,
    pub limit: ResultLimit,
    pub stats: MatchStats,
    pub failures: Vec<ScoringFailure>,
}

/// One normalized input collection
#[derive(Debug, Serialize)]
pub struct CollectionSummary {
    pub label: String,
    pub values: usize,
}

impl CollectionSummary {
    fn of(set: &ValueSet) -> Self {
        Self {
            label: set.label().to_string(),
            values: set.len(),
        }
    }
}

impl RunReport {
    pub fn new(schema: &ConfigSchema, source: &ValueSet, target: &ValueSet, outcome: MatchOutcome) -> Self {
        Self {
            session_id: fuzzy_lookup_telemetry::session_id().to_string(),
            output: schema.output.path.clone(),
            source: CollectionSummary::of(source),
            target: CollectionSummary::of(target),
            threshold: schema.matching.threshold,
            limit: ResultLimit::from_option(schema.matching.limit),
            stats: outcome.stats,
            failures: outcome.failures,
        }
    }

    pub fn print(&self, cli: &Cli) {
        match cli.format {
            Format::Json => match serde_json::to_string_pretty(self) {
                Ok(json) => println!("{}", json),
                Err(e) => Status::error(&format!("Failed to serialize summary: {}", e)),
            },
            Format::Text if cli.quiet => {}
            Format::Text => self.print_text(),
        }
    }

    fn print_text(&self) {
        let stats = &self.stats;
        Status::success(&format!(
            "{} written to {}",
            format_count(stats.pairs_kept, "match", "matches"),
            self.output.display()
        ));
        Status::info(&format!(
            "{} pairs scored in {} (threshold {}, limit {})",
            format_number(stats.pairs_scored),
            format_duration(stats.elapsed),
            self.threshold,
            self.limit
        ));

        if self.failures.is_empty() {
            return;
        }
        Status::warning(&format!(
            "{} could not be scored",
            format_count(self.failures.len(), "pair was", "pairs were")
        ));
        for failure in self.failures.iter().take(SHOWN_FAILURES) {
            eprintln!("    {}", failure.to_string().dimmed());
        }
        if self.failures.len() > SHOWN_FAILURES {
            eprintln!("    {}", format!("... and {} more", self.failures.len() - SHOWN_FAILURES).dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzy_lookup_search::Matcher;

    fn report() -> RunReport {
        let source = ValueSet::from_raw("left.csv,Name", ["Alpha Beta", "Gamma"]).unwrap();
        let target = ValueSet::from_raw("right.csv,Name", ["Beta Alpha", "Delta"]).unwrap();
        let mut schema = ConfigSchema::default();
        schema.matching.limit = Some(1);
        let outcome = Matcher::with_params(schema.matching.params())
            .run_sets(&source, &target)
            .unwrap();
        RunReport::new(&schema, &source, &target, outcome)
    }

    #[test]
    fn test_report_fields() {
        let report = report();
        assert_eq!(report.source.values, 2);
        assert_eq!(report.target.label, "right.csv,Name");
        assert_eq!(report.stats.pairs_total, 4);
        assert_eq!(report.stats.pairs_kept, 1);
        assert_eq!(report.limit, ResultLimit::PerSource(1));
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_report_json() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["stats"]["pairs_kept"], 1);
        assert_eq!(json["threshold"], 85);
        assert_eq!(json["output"], "fuzzy_match_output.csv");
        assert!(json["failures"].as_array().unwrap().is_empty());
    }
}
