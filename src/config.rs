//! Configuration for parsing and schema discovery
//!
//! Loaded from YAML. One file describes how timestamps are read and which
//! destination tables exist, with their columns and field filters.
//!
//! ```yaml
//! time_unit: millisecond
//! timezone: "+08:00"
//! tables:
//!   - name: access_log
//!     deny: "^debug_"
//!     columns:
//!       - { name: bytes, type: int }
//!       - { name: ts, source: "@timestamp", type: date_time, nullable: true }
//! ```

use crate::datetime::{DateTimeParser, Layout, TimeUnit, Timezone, DEFAULT_LAYOUTS};
use crate::error::{Error, Result};
use crate::metric::ColumnDef;
use crate::parser::ParseContext;
use crate::schema::KeyFilter;
use crate::types::FieldType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration loaded from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SinkerConfig {
    /// Unit of numeric Unix timestamps
    #[serde(default)]
    pub time_unit: TimeUnit,

    /// Timezone for date/time strings without an offset
    #[serde(default)]
    pub timezone: Timezone,

    /// RFC 3339 instant used for unparseable non-nullable date/time fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch_sentinel: Option<String>,

    /// Date/time layouts in priority order, replacing the defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layouts: Option<Vec<String>>,

    /// Destination tables
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

impl SinkerConfig {
    /// Look up a table by name
    pub fn table(&self, name: &str) -> Result<&TableConfig> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::table_not_found(name))
    }

    /// Effective epoch sentinel
    pub fn epoch_sentinel(&self) -> Result<DateTime<Utc>> {
        match &self.epoch_sentinel {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::invalid_value("epoch_sentinel", e.to_string())),
            None => Ok(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    /// Effective layout list
    pub fn layouts(&self) -> Vec<Layout> {
        match &self.layouts {
            Some(formats) => formats.iter().map(|s| Layout::new(s)).collect(),
            None => DEFAULT_LAYOUTS.clone(),
        }
    }

    /// Build the parsing context described by this config
    pub fn parse_context(&self) -> Result<ParseContext> {
        Ok(ParseContext::new()
            .with_time_unit(self.time_unit)
            .with_epoch_sentinel(self.epoch_sentinel()?)
            .with_datetime_parser(DateTimeParser::new(self.layouts(), self.timezone)))
    }
}

// ============================================================================
// Table Config
// ============================================================================

/// One destination table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Only fields matching this pattern may be added to the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<String>,

    /// Fields matching this pattern are never added to the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<String>,

    /// Columns the table already has
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

impl TableConfig {
    /// An unfiltered table with no columns
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allow: None,
            deny: None,
            columns: Vec::new(),
        }
    }

    /// Compile the allow/deny patterns
    pub fn key_filter(&self) -> Result<KeyFilter> {
        KeyFilter::new(self.allow.as_deref(), self.deny.as_deref())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate a config file
pub fn load_config(path: impl AsRef<Path>) -> Result<SinkerConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    load_config_from_str(&content)
}

/// Load and validate a config from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<SinkerConfig> {
    let config: SinkerConfig = serde_yaml::from_str(yaml)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate a config
fn validate_config(config: &SinkerConfig) -> Result<()> {
    config.epoch_sentinel()?;

    if let Some(layouts) = &config.layouts {
        if layouts.is_empty() {
            return Err(Error::invalid_value("layouts", "must not be empty"));
        }
        if layouts.iter().any(|l| l.trim().is_empty()) {
            return Err(Error::invalid_value("layouts", "layout cannot be blank"));
        }
    }

    let table_names: HashSet<_> = config.tables.iter().map(|t| &t.name).collect();
    if table_names.len() != config.tables.len() {
        return Err(Error::config("Duplicate table names found"));
    }

    for table in &config.tables {
        validate_table(table)?;
    }

    Ok(())
}

/// Validate a table definition
fn validate_table(table: &TableConfig) -> Result<()> {
    if table.name.is_empty() {
        return Err(Error::config("Table name cannot be empty"));
    }

    table.key_filter()?;

    let mut column_names = HashSet::new();
    for column in &table.columns {
        if column.name.is_empty() {
            return Err(Error::config(format!(
                "Table '{}' has a column with an empty name",
                table.name
            )));
        }
        if !column_names.insert(column.name.as_str()) {
            return Err(Error::config(format!(
                "Table '{}' has duplicate column '{}'",
                table.name, column.name
            )));
        }
        if column.field_type == FieldType::Unknown {
            return Err(Error::config(format!(
                "Column '{}.{}' cannot have type 'unknown'",
                table.name, column.name
            )));
        }
    }

    Ok(())
}
