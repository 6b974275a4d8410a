//! Date/time heuristics
//!
//! Recognizes timestamps in string fields by trying an ordered list of
//! layouts, and converts numeric Unix timestamps using a configured unit.
//!
//! # Layout priority
//!
//! The first layout that parses the whole string wins, so order decides how
//! ambiguous inputs are read. See [`DEFAULT_LAYOUTS`].

mod parser;
mod types;

pub use parser::{DateTimeParser, DEFAULT_LAYOUTS};
pub use types::{Layout, TimeUnit, Timezone};
