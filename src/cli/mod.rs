//! CLI module
//!
//! Command-line interface over the parser and schema tracker.
//!
//! # Commands
//!
//! - `discover` - Find new fields in a JSON lines stream
//! - `extract` - Print typed rows for a table
//! - `detect` - Print detected field types per record
//! - `datetime` - Try the date/time layouts on one value
//! - `layouts` - List the effective layouts

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
