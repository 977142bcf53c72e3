//! The matching pipeline: configure, read, score, write.

use crate::report::RunReport;
use crate::{Cli, Format};
use fuzzy_lookup_cli::output::Status;
use fuzzy_lookup_cli::progress::{finish_error, finish_success, spinner, MatchProgress};
use fuzzy_lookup_core::config::{ColumnInput, Config, ConfigSchema};
use fuzzy_lookup_core::input::{CsvColumnSource, InputProvider, LabelledColumn};
use fuzzy_lookup_core::output::{CsvSink, ResultSink};
use fuzzy_lookup_core::{Error, Result, ResultExt};
use fuzzy_lookup_search::{CancellationToken, MatchSet, Matcher, ValueSet};
use fuzzy_lookup_telemetry::Timer;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

const STEPS: usize = 3;

/// Run one lookup described by the config file and the command line
///
/// Cancelling `cancel` stops scoring; the run then fails with
/// `ErrorCode::Cancelled` and no output is written.
pub fn execute(cli: &Cli, config: Config, cancel: CancellationToken) -> Result<RunReport> {
    let mut schema = config.schema;
    apply_overrides(&mut schema, cli);
    schema.validate()?;

    if cli.format == Format::Json && schema.output.path == Path::new("-") {
        return Err(Error::validation("--format json cannot be combined with --output -")
            .with_suggestion("Write the matches to a file with --output <PATH>"));
    }

    tracing::info!(
        session_id = fuzzy_lookup_telemetry::session_id(),
        config = ?config.path,
        threshold = schema.matching.threshold,
        limit = ?schema.matching.limit,
        "Starting fuzzy lookup"
    );

    if cli.interactive() {
        Status::step(1, STEPS, "Reading input columns");
    }
    let timer = Timer::start("reading");
    let source = read_collection(cli, &schema.input.source, "source")?;
    let target = read_collection(cli, &schema.input.target, "target")?;
    timer.stop();

    let source = ValueSet::from_raw(source.label, source.values)?;
    let target = ValueSet::from_raw(target.label, target.values)?;

    if cli.interactive() {
        Status::step(2, STEPS, &format!("Scoring {} x {} values", source.len(), target.len()));
    }
    let progress = if cli.interactive() {
        MatchProgress::new()
    } else {
        MatchProgress::hidden()
    };
    let matcher = Matcher::with_params(schema.matching.params())
        .workers(schema.matching.workers)
        .scorer_options(schema.matching.scorer_options())
        .max_value_chars(schema.matching.max_value_chars)
        .cancellation(cancel)
        .progress(Arc::new(progress));

    let outcome = matcher.run_sets(&source, &target)?;

    if cli.interactive() {
        Status::step(3, STEPS, &format!("Writing {}", schema.output.path.display()));
    }
    let timer = Timer::start("writing");
    write_matches(&schema, &outcome.matches)?;
    timer.stop();

    Ok(RunReport::new(&schema, &source, &target, outcome))
}

/// Command-line flags win over the config file
fn apply_overrides(schema: &mut ConfigSchema, cli: &Cli) {
    let input = &mut schema.input;
    override_column(&mut input.source, cli, Side::Source);
    override_column(&mut input.target, cli, Side::Target);

    let matching = &mut schema.matching;
    if let Some(threshold) = cli.threshold {
        matching.threshold = threshold;
    }
    if cli.limit.is_some() {
        matching.limit = cli.limit;
    }
    if let Some(workers) = cli.workers {
        matching.workers = workers;
    }
    if cli.full_process {
        matching.full_process = true;
    }

    if let Some(path) = &cli.output {
        schema.output.path = path.clone();
    }
    if cli.no_index {
        schema.output.index = false;
    }
}

#[derive(Clone, Copy)]
enum Side {
    Source,
    Target,
}

fn override_column(input: &mut ColumnInput, cli: &Cli, side: Side) {
    let (path, column, header) = match side {
        Side::Source => (&cli.source, &cli.source_column, cli.source_header),
        Side::Target => (&cli.target, &cli.target_column, cli.target_header),
    };
    if let Some(path) = path {
        input.path = Some(path.clone());
    }
    if let Some(column) = column {
        input.column = Some(column.clone());
    }
    if let Some(header) = header {
        input.header_row = header;
    }
    if let Some(delimiter) = cli.delimiter {
        input.delimiter = delimiter;
    }
    if cli.keep_blank {
        input.skip_blank = false;
    }
}

fn read_collection(cli: &Cli, input: &ColumnInput, name: &str) -> Result<LabelledColumn> {
    let provider = CsvColumnSource::from_config(input)?;
    let pb = cli
        .interactive()
        .then(|| spinner(&format!("Reading {} column from {}", name, provider.path().display())));

    let result = provider
        .provide()
        .context(format!("While reading the {} collection", name));

    if let Some(pb) = pb {
        match &result {
            Ok(column) => finish_success(&pb, &format!("{} values from {}", column.values.len(), column.label)),
            Err(_) => finish_error(&pb, &format!("Could not read {}", provider.path().display())),
        }
    }
    result
}

fn write_matches(schema: &ConfigSchema, matches: &MatchSet) -> Result<()> {
    let output = &schema.output;
    let mut sink = CsvSink::create(&output.path, output.delimiter as u8, output.index)?;
    let rows = sink.write_matches(matches)?;
    sink.into_inner()?
        .flush()
        .map_err(Error::from)
        .context(format!("Flushing {}", output.path.display()))?;
    tracing::debug!(rows, path = %output.path.display(), "Results written");
    Ok(())
}
