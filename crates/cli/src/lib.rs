//! CLI utilities for the fuzzy lookup tool
//!
//! Provides shared CLI functionality:
//! - Terminal output formatting
//! - Progress bars driven by the matching engine
//! - Status messages

#![warn(missing_docs)]

pub mod output;
pub mod progress;
