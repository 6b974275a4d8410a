//! Discovery of fields a destination has not seen before

use super::detect::detect_type;
use super::keys::{KeyFilter, KnownKeys, NewField, NewKeys};
use crate::config::TableConfig;
use crate::error::Result;
use crate::metric::Metric;
use crate::types::FieldType;
use tracing::{debug, warn};

/// Record the unseen top-level fields of `metric`.
///
/// Returns whether at least one field was added to `new`.
///
/// A key becomes known once a decision is made about it: either it was
/// rejected by `filter`, or its type was detected. A key whose type is still
/// `Unknown` (null, empty array) stays unknown and is examined again on the
/// next record that carries it. Safe to call concurrently on the same sets;
/// each key is added to `new` by exactly one caller.
pub fn discover_new_keys(
    metric: &Metric<'_>,
    known: &KnownKeys,
    new: &NewKeys,
    filter: &KeyFilter,
) -> bool {
    let mut found = false;

    for (key, value) in metric.object() {
        if known.contains(key) {
            continue;
        }

        if !filter.admits(key) {
            if known.insert(key) {
                warn!(field = %key, value = %value, "ignored new field due to allow/deny filter");
            }
            continue;
        }

        let field_type = detect_type(value, metric.context().datetimes());
        if field_type == FieldType::Unknown {
            debug!(field = %key, value = %value, "cannot detect field type yet");
            continue;
        }

        if known.insert(key) {
            debug!(field = %key, %field_type, "discovered new field");
            new.insert(key.clone(), field_type);
            found = true;
        }
    }

    found
}

/// Known and newly discovered fields of one destination table
#[derive(Debug, Default)]
pub struct SchemaTracker {
    table: String,
    known: KnownKeys,
    new: NewKeys,
    filter: KeyFilter,
}

impl SchemaTracker {
    /// Create a tracker with no known fields and no filter
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Build a tracker from a table definition.
    ///
    /// The table's existing columns are seeded as known.
    pub fn from_table(table: &TableConfig) -> Result<Self> {
        let tracker = Self::new(&table.name).with_filter(table.key_filter()?);
        tracker.seed_known(table.columns.iter().map(|c| c.source_key()));
        Ok(tracker)
    }

    /// Set the allow/deny filter
    #[must_use]
    pub fn with_filter(mut self, filter: KeyFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Mark fields the destination already has
    pub fn seed_known<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            self.known.insert(key.as_ref());
        }
    }

    /// Run discovery on one record
    pub fn discover(&self, metric: &Metric<'_>) -> bool {
        discover_new_keys(metric, &self.known, &self.new, &self.filter)
    }

    /// Take the pending fields, sorted by name
    pub fn drain_new_keys(&self) -> Vec<NewField> {
        self.new.drain()
    }

    /// Pending fields without removing them
    pub fn pending(&self) -> Vec<NewField> {
        self.new.snapshot()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.known.contains(key)
    }

    pub fn known_len(&self) -> usize {
        self.known.len()
    }

    pub fn pending_len(&self) -> usize {
        self.new.len()
    }

    pub fn known(&self) -> &KnownKeys {
        &self.known
    }

    pub fn new_keys(&self) -> &NewKeys {
        &self.new
    }

    pub fn filter(&self) -> &KeyFilter {
        &self.filter
    }
}
