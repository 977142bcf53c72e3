//! Result sinks
//!
//! A result sink consumes the match set as rows of (source, target, score)
//! under the two provenance labels plus a fixed `Score` header.

use crate::error::{Error, Result, ResultExt};
use fuzzy_lookup_search::MatchSet;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Header of the score column
pub const SCORE_HEADER: &str = "Score";

/// Consumes a finished match set
pub trait ResultSink {
    /// Write every record, returning how many rows were written
    fn write_matches(&mut self, matches: &MatchSet) -> Result<usize>;
}

/// Delimited text writer with one header row and one row per record
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    index: bool,
}

impl<W: Write> CsvSink<W> {
    /// Sink writing to `writer`
    pub fn new(writer: W, delimiter: u8, index: bool) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(writer);
        Self { writer, index }
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::io(format!("Failed to flush output: {}", e.error())))
    }
}

impl CsvSink<Box<dyn Write>> {
    /// Sink for a file path, or stdout when the path is `-`
    pub fn create(path: &Path, delimiter: u8, index: bool) -> Result<Self> {
        let writer: Box<dyn Write> = if path == Path::new("-") {
            Box::new(io::stdout().lock())
        } else {
            let file = File::create(path)
                .map_err(Error::from)
                .context(format!("Creating output file {}", path.display()))?;
            Box::new(io::BufWriter::new(file))
        };
        Ok(Self::new(writer, delimiter, index))
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn write_matches(&mut self, matches: &MatchSet) -> Result<usize> {
        let mut header = Vec::with_capacity(4);
        if self.index {
            header.push("");
        }
        header.extend([matches.source_label(), matches.target_label(), SCORE_HEADER]);
        self.writer.write_record(&header)?;

        for (row, record) in matches.iter().enumerate() {
            let score = record.score.to_string();
            if self.index {
                let row = row.to_string();
                self.writer
                    .write_record([row.as_str(), record.source.as_str(), record.target.as_str(), score.as_str()])?;
            } else {
                self.writer
                    .write_record([record.source.as_str(), record.target.as_str(), score.as_str()])?;
            }
        }

        self.writer.flush()?;
        tracing::debug!(rows = matches.len(), "Match set written");
        Ok(matches.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzy_lookup_search::{Matcher, ResultLimit, ValueSet};

    fn sample() -> MatchSet {
        let source = ValueSet::from_raw("left.csv,Name", ["Alpha Beta", "Gamma, Inc"]).unwrap();
        let target = ValueSet::from_raw("right.csv,Company", ["Beta Alpha", "Gamma, Inc"]).unwrap();
        Matcher::new(90, ResultLimit::Unbounded)
            .run_sets(&source, &target)
            .unwrap()
            .matches
    }

    fn render(index: bool) -> String {
        let mut sink = CsvSink::new(Vec::new(), b',', index);
        let rows = sink.write_matches(&sample()).unwrap();
        assert_eq!(rows, 2);
        String::from_utf8(sink.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_csv_with_index() {
        assert_eq!(
            render(true),
            ",\"left.csv,Name\",\"right.csv,Company\",Score\n\
             0,Alpha Beta,Beta Alpha,100\n\
             1,\"Gamma, Inc\",\"Gamma, Inc\",100\n"
        );
    }

    #[test]
    fn test_csv_without_index() {
        let text = render(false);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("\"left.csv,Name\",\"right.csv,Company\",Score"));
        assert_eq!(lines.next(), Some("Alpha Beta,Beta Alpha,100"));
    }

    #[test]
    fn test_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&path, b';', false).unwrap();
        sink.write_matches(&sample()).unwrap();
        drop(sink.into_inner().unwrap());

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("left.csv,Name;right.csv,Company;Score\n"));
    }
}
