//! Configuration loading and schema definitions
//!
//! A run is described once, up front, by a [`ConfigSchema`]: loaded from a
//! TOML file when one exists, overridden by command-line flags, then
//! validated before any input is read.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
