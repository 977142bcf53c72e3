//! Error handling with codes, context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Detailed error context
//! - Recovery suggestions
//! - Error codes for programmatic handling
//! - Serializable error reports

use fuzzy_lookup_search::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    InvalidConfigValue = 3004,

    // Input errors (4xxx)
    CsvError = 4001,
    HeaderRowMissing = 4002,
    ColumnNotFound = 4003,

    // Validation errors (6xxx)
    ValidationError = 6000,
    EmptyInput = 6001,
    InvalidParameter = 6002,

    // Matching errors (9xxx)
    Cancelled = 9001,
    WorkerPool = 9002,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            2 => "IO",
            3 => "Configuration",
            4 => "Input",
            6 => "Validation",
            9 => "Matching",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    ///
    /// Context already present is kept after the new one, outermost first.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(inner) => format!("{}: {}", context, inner),
            None => context,
        });
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.code.code() / 1000 {
            3 => exit_codes::CONFIG_ERROR,
            4 => exit_codes::INPUT_ERROR,
            6 => exit_codes::VALIDATION_ERROR,
            _ if self.code == ErrorCode::Cancelled => exit_codes::CANCELLED,
            _ => exit_codes::FAILURE,
        }
    }

    // Convenience constructors

    /// Generic IO failure
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    /// Input file does not exist
    pub fn file_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Check that the file exists and you have read permissions")
    }

    /// Explicitly requested config file is missing
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .fuzzy-lookup.toml file or use --config to specify a path")
    }

    /// Config value outside its valid range
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfigValue, message)
    }

    /// File has fewer rows than the configured header row
    pub fn header_row_missing(path: impl AsRef<std::path::Path>, header_row: usize) -> Self {
        Self::new(
            ErrorCode::HeaderRowMissing,
            format!(
                "Row {} of {} is missing or blank, it cannot be used as header",
                header_row,
                path.as_ref().display()
            ),
        )
        .with_suggestion("Pass the 1-indexed row that holds the column headers with --source-header/--target-header")
    }

    /// Requested column does not exist
    pub fn column_not_found(column: impl fmt::Display, available: &[String]) -> Self {
        Self::new(ErrorCode::ColumnNotFound, format!("Column not found: {}", column))
            .with_context(format!("Available columns: {}", available.join(", ")))
            .with_suggestion("Select the column by its header name or 0-based index")
    }

    /// Generic validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }
}

/// Serializable error report for logging and machine-readable output
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for the command line
#[allow(missing_docs)]
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const INPUT_ERROR: i32 = 4;
    pub const PARTIAL_RESULT: i32 = 5;
    pub const CANCELLED: i32 = 130;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            if let csv::ErrorKind::Io(io) = err.into_kind() {
                return Error::from(io);
            }
            return Error::io("CSV I/O error");
        }
        Error::new(ErrorCode::CsvError, format!("CSV error: {}", err)).with_source(err)
    }
}

impl From<SearchError> for Error {
    fn from(err: SearchError) -> Self {
        let code = match &err {
            SearchError::EmptyInput { .. } => ErrorCode::EmptyInput,
            SearchError::InvalidParameter(_) => ErrorCode::InvalidParameter,
            SearchError::Cancelled { .. } => ErrorCode::Cancelled,
            SearchError::WorkerPool(_) => ErrorCode::WorkerPool,
        };
        let mut error = Error::new(code, err.to_string());
        if code == ErrorCode::EmptyInput {
            error = error.with_suggestion(
                "Check the selected column and header row; blank cells are skipped",
            );
        }
        error.with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Attach a recovery suggestion to the error
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::ColumnNotFound.to_string(), "E4003");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::CsvError.category(), "Input");
        assert_eq!(ErrorCode::Cancelled.category(), "Matching");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::file_not_found("/path/to/file")
            .with_context("While loading the source collection");

        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_context_chains_outermost_first() {
        let err = Error::column_not_found("Title", &["Id".to_string(), "Name".to_string()])
            .with_context("While reading the source collection");
        assert_eq!(
            err.context.as_deref(),
            Some("While reading the source collection: Available columns: Id, Name")
        );

        let result: Result<()> = Err(Error::io("disk full"));
        let err = result.context("Flushing out.csv").unwrap_err();
        assert_eq!(err.context.as_deref(), Some("Flushing out.csv"));
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::column_not_found("Name", &["Id".to_string(), "Title".to_string()]);

        let report = err.to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E4003"));
        assert!(json.contains("Id, Title"));
    }

    #[test]
    fn test_search_error_conversion() {
        let err: Error = SearchError::EmptyInput { collection: "source".into() }.into();
        assert_eq!(err.code, ErrorCode::EmptyInput);
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_ERROR);

        let err: Error = SearchError::Cancelled { scored: 1, total: 2 }.into();
        assert_eq!(err.exit_code(), exit_codes::CANCELLED);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert_eq!(err.exit_code(), exit_codes::FAILURE);
    }
}
