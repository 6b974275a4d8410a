//! Schema discovery module
//!
//! Detects fields a destination table has never seen and infers their types
//! so a schema migration can add them.
//!
//! # Features
//!
//! - **Type Detection**: Infers a column type from one JSON value
//! - **Array Type Inference**: Arrays are typed by their first element
//! - **Date/Time Recognition**: Strings matching a known layout are dates
//! - **Concurrent Tracking**: Known and new keys are safe to share across workers
//! - **Allow/Deny Filters**: Regex policy for which fields may evolve the schema

mod detect;
mod keys;
mod tracker;

pub use detect::detect_type;
pub use keys::{KeyFilter, KnownKeys, NewField, NewKeys};
pub use tracker::{discover_new_keys, SchemaTracker};

#[cfg(test)]
mod tests;
