//! Configuration schema definitions
//!
//! One TOML document describes both input collections, the matching
//! parameters and the output file. Every field has a default so a partial
//! file (or none at all) is valid; command-line flags fill in the rest.

use crate::error::{Error, Result};
use fuzzy_lookup_search::{MatchParams, ResultLimit, ScorerOptions, DEFAULT_MAX_VALUE_CHARS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// `[input.source]` and `[input.target]`
    #[serde(default)]
    pub input: InputConfig,

    /// `[matching]`
    #[serde(default)]
    pub matching: MatchingConfig,

    /// `[output]`
    #[serde(default)]
    pub output: OutputConfig,

    /// `[logging]`
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Check every value that has a range, once, before any work starts.
    pub fn validate(&self) -> Result<()> {
        self.input.source.validate("input.source")?;
        self.input.target.validate("input.target")?;
        self.matching.validate()?;
        self.output.validate()
    }
}

/// Both input collections
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InputConfig {
    /// Values to match
    #[serde(default)]
    pub source: ColumnInput,

    /// Values to be matched against
    #[serde(default)]
    pub target: ColumnInput,
}

/// Which column of which delimited file to read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInput {
    /// Path of the delimited text file
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Column header name or 0-based index
    #[serde(default)]
    pub column: Option<ColumnSelector>,

    /// 1-indexed line holding the headers; lines above it, blank ones
    /// included, are skipped. 0 means the file has no header row.
    #[serde(default = "default_header_row")]
    pub header_row: usize,

    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Drop cells that are empty after trimming
    #[serde(default = "default_true")]
    pub skip_blank: bool,
}

impl Default for ColumnInput {
    fn default() -> Self {
        Self {
            path: None,
            column: None,
            header_row: default_header_row(),
            delimiter: default_delimiter(),
            skip_blank: true,
        }
    }
}

impl ColumnInput {
    fn validate(&self, field: &str) -> Result<()> {
        if self.path.is_none() {
            return Err(Error::invalid_config(format!("{field}.path is not set"))
                .with_suggestion("Set the path in the config file or pass it on the command line"));
        }
        if !self.delimiter.is_ascii() {
            return Err(Error::invalid_config(format!(
                "{field}.delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if self.header_row == 0 && matches!(self.column, Some(ColumnSelector::Name(_))) {
            return Err(Error::invalid_config(format!(
                "{field}.column selects by name but header_row is 0"
            ))
            .with_suggestion("Select the column by 0-based index when the file has no header row"));
        }
        Ok(())
    }
}

fn default_header_row() -> usize {
    1
}

fn default_delimiter() -> char {
    ','
}

fn default_true() -> bool {
    true
}

/// Column chosen by header name or by 0-based position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSelector {
    /// 0-based position
    Index(usize),
    /// Exact header text
    Name(String),
}

impl Default for ColumnSelector {
    fn default() -> Self {
        ColumnSelector::Index(0)
    }
}

impl FromStr for ColumnSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(index) => ColumnSelector::Index(index),
            Err(_) => ColumnSelector::Name(s.to_string()),
        })
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::Index(index) => write!(f, "#{index}"),
            ColumnSelector::Name(name) => write!(f, "{name:?}"),
        }
    }
}

/// Matching parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum score to keep a pair (0-100, inclusive)
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// Maximum matches kept per source value; unset keeps all
    #[serde(default)]
    pub limit: Option<usize>,

    /// Scoring threads; 0 uses one per logical CPU
    #[serde(default)]
    pub workers: usize,

    /// Lower-case and strip punctuation before scoring
    #[serde(default)]
    pub full_process: bool,

    /// Values longer than this are skipped and reported
    #[serde(default = "default_max_value_chars")]
    pub max_value_chars: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            limit: None,
            workers: 0,
            full_process: false,
            max_value_chars: default_max_value_chars(),
        }
    }
}

impl MatchingConfig {
    fn validate(&self) -> Result<()> {
        self.params().validate().map_err(Error::from)?;
        if self.max_value_chars == 0 {
            return Err(Error::invalid_config("matching.max_value_chars must be positive"));
        }
        Ok(())
    }

    /// Engine parameters described by this section
    pub fn params(&self) -> MatchParams {
        MatchParams::new(self.threshold, ResultLimit::from_option(self.limit))
    }

    /// Scorer options described by this section
    pub fn scorer_options(&self) -> ScorerOptions {
        ScorerOptions {
            full_process: self.full_process,
        }
    }
}

fn default_threshold() -> u32 {
    85
}

fn default_max_value_chars() -> usize {
    DEFAULT_MAX_VALUE_CHARS
}

/// Result file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination file; "-" writes to stdout
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Write a leading 0-based row index column
    #[serde(default = "default_true")]
    pub index: bool,

    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            index: true,
            delimiter: default_delimiter(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(Error::invalid_config(format!(
                "output.delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        Ok(())
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("fuzzy_match_output.csv")
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human readable logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ConfigSchema {
        let mut schema = ConfigSchema::default();
        schema.input.source.path = Some("left.csv".into());
        schema.input.target.path = Some("right.csv".into());
        schema
    }

    #[test]
    fn test_defaults() {
        let schema = ConfigSchema::default();
        assert_eq!(schema.matching.threshold, 85);
        assert_eq!(schema.matching.limit, None);
        assert_eq!(schema.input.source.header_row, 1);
        assert!(schema.input.source.skip_blank);
        assert_eq!(schema.output.path, PathBuf::from("fuzzy_match_output.csv"));
        assert!(schema.output.index);
    }

    #[test]
    fn test_parse_partial_toml() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [input.source]
            path = "customers.csv"
            column = "Name"
            header_row = 3

            [input.target]
            path = "suppliers.csv"
            column = 2
            delimiter = ";"

            [matching]
            threshold = 90
            limit = 5
            "#,
        )
        .unwrap();

        assert_eq!(schema.input.source.column, Some(ColumnSelector::Name("Name".into())));
        assert_eq!(schema.input.source.header_row, 3);
        assert_eq!(schema.input.target.column, Some(ColumnSelector::Index(2)));
        assert_eq!(schema.input.target.delimiter, ';');
        assert_eq!(schema.matching.params(), MatchParams::new(90, ResultLimit::PerSource(5)));
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_paths() {
        assert!(ConfigSchema::default().validate().is_err());
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_validate_threshold() {
        let mut schema = complete();
        schema.matching.threshold = 101;
        let err = schema.validate().unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_validate_limit() {
        let mut schema = complete();
        schema.matching.limit = Some(0);
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_name_without_header() {
        let mut schema = complete();
        schema.input.source.header_row = 0;
        schema.input.source.column = Some(ColumnSelector::Name("Name".into()));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_column_selector_from_str() {
        assert_eq!("3".parse::<ColumnSelector>().unwrap(), ColumnSelector::Index(3));
        assert_eq!(
            "Company".parse::<ColumnSelector>().unwrap(),
            ColumnSelector::Name("Company".into())
        );
    }
}
