//! Typed accessor module
//!
//! A [`Metric`] is a read-only view over one parsed record that turns JSON
//! fields into column values.
//!
//! # Coercion rules
//!
//! - **String**: strings verbatim, other types rendered as compact JSON
//! - **Float**: JSON numbers only
//! - **Int**: booleans as 1/0, numbers that are whole and fit in `i64`
//! - **DateTime**: Unix timestamps scaled by the configured unit, or strings
//!   matched against the layout list
//! - **Arrays**: element-wise with the rules above, mismatches become zero
//!
//! Anything that does not fit degrades to `None` (nullable) or the zero value.

mod accessor;
mod coerce;
mod row;

pub use accessor::Metric;
pub use row::ColumnDef;

pub(crate) use coerce::decode_int;
