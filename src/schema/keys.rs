//! Concurrent key sets and field filters

use crate::error::{Error, Result};
use crate::types::FieldType;
use dashmap::{DashMap, DashSet};
use regex::Regex;
use serde::Serialize;

// ============================================================================
// Known Keys
// ============================================================================

/// Every field name classified so far for one destination.
///
/// Only grows.
#[derive(Debug, Default)]
pub struct KnownKeys(DashSet<String>);

impl KnownKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Insert a key, returning `true` if this call added it.
    ///
    /// Of any number of concurrent inserts of the same key exactly one
    /// returns `true`.
    pub fn insert(&self, key: &str) -> bool {
        self.0.insert(key.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sorted snapshot of the set
    pub fn to_vec(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.0.iter().map(|k| k.key().clone()).collect();
        keys.sort_unstable();
        keys
    }
}

impl<S: AsRef<str>> FromIterator<S> for KnownKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let known = KnownKeys::new();
        for key in iter {
            known.insert(key.as_ref());
        }
        known
    }
}

// ============================================================================
// New Keys
// ============================================================================

/// A field discovered in the current window, pending schema migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl NewField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Newly discovered fields and their inferred types
#[derive(Debug, Default)]
pub struct NewKeys(DashMap<String, FieldType>);

impl NewKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: String, field_type: FieldType) {
        self.0.insert(key, field_type);
    }

    pub fn get(&self, key: &str) -> Option<FieldType> {
        self.0.get(key).map(|entry| *entry)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sorted copy of the pending fields
    pub fn snapshot(&self) -> Vec<NewField> {
        let mut fields: Vec<NewField> = self
            .0
            .iter()
            .map(|entry| NewField::new(entry.key().clone(), *entry.value()))
            .collect();
        fields.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        fields
    }

    /// Remove and return the pending fields, sorted by name.
    ///
    /// Fields inserted while draining are either returned now or left for the
    /// next drain.
    pub fn drain(&self) -> Vec<NewField> {
        let keys: Vec<String> = self.0.iter().map(|entry| entry.key().clone()).collect();
        let mut fields: Vec<NewField> = keys
            .into_iter()
            .filter_map(|key| self.0.remove(&key))
            .map(|(name, field_type)| NewField::new(name, field_type))
            .collect();
        fields.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        fields
    }
}

// ============================================================================
// Key Filter
// ============================================================================

/// Allow/deny policy deciding which new fields may evolve the schema
#[derive(Debug, Clone, Default)]
pub struct KeyFilter {
    allow: Option<Regex>,
    deny: Option<Regex>,
}

impl KeyFilter {
    /// A filter admitting every key
    pub fn none() -> Self {
        Self::default()
    }

    /// Compile optional allow and deny patterns
    pub fn new(allow: Option<&str>, deny: Option<&str>) -> Result<Self> {
        Ok(Self {
            allow: allow.map(compile).transpose()?,
            deny: deny.map(compile).transpose()?,
        })
    }

    /// Whether a key passes the allow pattern and avoids the deny pattern
    pub fn admits(&self, key: &str) -> bool {
        self.allow.as_ref().map_or(true, |re| re.is_match(key))
            && !self.deny.as_ref().is_some_and(|re| re.is_match(key))
    }

    /// Whether no pattern is configured
    pub fn is_empty(&self) -> bool {
        self.allow.is_none() && self.deny.is_none()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e))
}
