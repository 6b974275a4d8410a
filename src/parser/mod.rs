//! Record parser module
//!
//! Turns raw message buffers into [`Metric`](crate::metric::Metric) views.
//!
//! # Overview
//!
//! A [`JsonParser`] is owned by exactly one worker at a time. The
//! [`ParserPool`] keeps idle parsers around so each task reuses one instead
//! of building a new parser per record. All parsers of a pool share one
//! [`ParseContext`].

mod context;
mod json;
mod pool;

pub use context::ParseContext;
pub use json::{value_kind, JsonParser};
pub use pool::{ParserPool, PooledParser};
