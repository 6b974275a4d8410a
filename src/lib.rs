// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # sinker-parse
//!
//! Record parsing and dynamic schema discovery for a log/metric sink.
//!
//! Raw JSON records are parsed into a typed [`Metric`] view whose getters
//! coerce loosely typed values into column types. While records stream by,
//! a [`SchemaTracker`] notices fields the destination table has never seen
//! and infers their types so the table can be migrated.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sinker_parse::{load_config, ParserPool, SchemaTracker};
//!
//! let config = load_config("sinker.yaml")?;
//! let pool = ParserPool::new(config.parse_context()?);
//! let tracker = SchemaTracker::from_table(config.table("access_log")?)?;
//!
//! let mut parser = pool.get();
//! let metric = parser.parse(br#"{"status": 200, "ts": "2024-05-01T10:00:00Z"}"#)?;
//! let status = metric.get_int("status", false);
//! tracker.discover(&metric);
//!
//! for field in tracker.drain_new_keys() {
//!     println!("{} {}", field.name, field.field_type.clickhouse_type());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   bytes ──► JsonParser ──► Metric ──► getters ──► ColumnValue row
//!                              │
//!                              └──► detect_type ──► SchemaTracker ──► new fields
//!                                        │
//!                                  DateTimeParser (layouts, cache)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Heuristic date/time parsing
pub mod datetime;

/// Reusable JSON parsers
pub mod parser;

/// Typed accessors over a parsed record
pub mod metric;

/// Type detection and new-field discovery
pub mod schema;

/// YAML configuration
pub mod config;

/// Bounded worker pool
pub mod worker;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, SinkerConfig, TableConfig};
pub use datetime::{DateTimeParser, Layout, TimeUnit, Timezone};
pub use metric::{ColumnDef, Metric};
pub use parser::{JsonParser, ParseContext, ParserPool};
pub use schema::{detect_type, discover_new_keys, KeyFilter, NewField, SchemaTracker};
pub use worker::WorkerPool;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
