//! Core utilities for the fuzzy lookup tool
//!
//! This crate provides the boundary around the matching engine:
//!
//! - **Error handling**: errors with codes, context and recovery suggestions
//! - **Configuration**: TOML-based run description, validated once up front
//! - **Input**: labelled value collections read from delimited text files
//! - **Output**: match sets written as delimited text
//!
//! # Example
//!
//! ```rust,no_run
//! use fuzzy_lookup_core::config::Config;
//! use fuzzy_lookup_core::input::{CsvColumnSource, InputProvider};
//!
//! let config = Config::load(None).expect("Invalid configuration");
//! config.schema.validate().expect("Incomplete configuration");
//!
//! let source = CsvColumnSource::from_config(&config.schema.input.source)
//!     .and_then(|provider| provider.provide())
//!     .expect("Failed to read source column");
//! println!("{} values from {}", source.values.len(), source.label);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod input;
pub mod output;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ColumnSelector, Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::input::{CsvColumnSource, InputProvider, LabelledColumn};
    pub use crate::output::{CsvSink, ResultSink};
}
