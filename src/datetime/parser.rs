//! Heuristic date/time parsing over an ordered layout list

use super::types::{Layout, Timezone};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

/// Layouts tried when none are configured, in priority order.
///
/// Numeric day/month forms such as `01/02/2021` are left out because their
/// reading depends on the producer's locale.
pub static DEFAULT_LAYOUTS: Lazy<Vec<Layout>> = Lazy::new(|| {
    [
        "rfc3339",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f %z",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S%.f",
        "%d/%b/%Y:%H:%M:%S %z",
        "rfc2822",
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%b-%Y",
    ]
    .iter()
    .map(|format| Layout::new(format))
    .collect()
});

/// Parses strings against a fixed, ordered list of layouts.
///
/// Keeps an advisory cache of the last layout that matched for each field, so
/// fields with a stable format skip the scan. The cache may be raced on
/// freely; a stale entry only costs a rescan.
#[derive(Debug)]
pub struct DateTimeParser {
    layouts: Vec<Layout>,
    timezone: Timezone,
    cache: DashMap<String, usize>,
}

impl Default for DateTimeParser {
    fn default() -> Self {
        Self::new(DEFAULT_LAYOUTS.clone(), Timezone::Utc)
    }
}

impl DateTimeParser {
    /// Create a parser trying `layouts` in order
    pub fn new(layouts: Vec<Layout>, timezone: Timezone) -> Self {
        Self {
            layouts,
            timezone,
            cache: DashMap::new(),
        }
    }

    /// Create a parser with the default layouts
    pub fn with_timezone(timezone: Timezone) -> Self {
        Self::new(DEFAULT_LAYOUTS.clone(), timezone)
    }

    /// Layouts in priority order
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// Timezone applied to naive layouts
    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// Scan all layouts, returning the instant and the first layout that matched
    pub fn parse(&self, value: &str) -> Option<(DateTime<Utc>, &Layout)> {
        self.scan(value)
            .map(|(ts, index)| (ts, &self.layouts[index]))
    }

    /// Whether any layout matches
    pub fn matches(&self, value: &str) -> bool {
        self.scan(value).is_some()
    }

    /// Parse a value of field `key`, trying the field's cached layout first.
    pub fn parse_field(&self, key: &str, value: &str) -> Option<DateTime<Utc>> {
        let cached = self.cache.get(key).map(|entry| *entry);
        if let Some(index) = cached {
            if let Some(ts) = self.layouts[index].apply(value, self.timezone) {
                return Some(ts);
            }
            debug!(
                field = key,
                layout = %self.layouts[index],
                "cached layout no longer matches, rescanning"
            );
        }

        let (ts, index) = self.scan(value)?;
        if cached != Some(index) {
            self.cache.insert(key.to_string(), index);
        }
        Some(ts)
    }

    /// Layout currently cached for a field
    pub fn cached_layout(&self, key: &str) -> Option<&Layout> {
        self.cache
            .get(key)
            .map(|entry| *entry)
            .map(|index| &self.layouts[index])
    }

    /// Number of fields with a cached layout
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn scan(&self, value: &str) -> Option<(DateTime<Utc>, usize)> {
        if value.is_empty() {
            return None;
        }
        self.layouts
            .iter()
            .enumerate()
            .find_map(|(index, layout)| layout.apply(value, self.timezone).map(|ts| (ts, index)))
    }
}
