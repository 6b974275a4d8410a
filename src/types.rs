//! Common types used throughout sinker-parse
//!
//! Field types inferred during schema discovery and the typed column values
//! produced by the accessors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Field Type
// ============================================================================

/// Logical column type of a field.
///
/// Arrays are typed by their first element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Type could not be inferred (null, empty array)
    #[default]
    Unknown,
    Int,
    Float,
    String,
    DateTime,
    IntArray,
    FloatArray,
    StringArray,
    DateTimeArray,
}

impl FieldType {
    /// Whether this is one of the array variants
    pub fn is_array(self) -> bool {
        matches!(
            self,
            FieldType::IntArray
                | FieldType::FloatArray
                | FieldType::StringArray
                | FieldType::DateTimeArray
        )
    }

    /// Array variant whose elements are of this scalar type
    pub fn array_of(self) -> Option<FieldType> {
        match self {
            FieldType::Int => Some(FieldType::IntArray),
            FieldType::Float => Some(FieldType::FloatArray),
            FieldType::String => Some(FieldType::StringArray),
            FieldType::DateTime => Some(FieldType::DateTimeArray),
            _ => None,
        }
    }

    /// Element type of an array variant
    pub fn element_type(self) -> Option<FieldType> {
        match self {
            FieldType::IntArray => Some(FieldType::Int),
            FieldType::FloatArray => Some(FieldType::Float),
            FieldType::StringArray => Some(FieldType::String),
            FieldType::DateTimeArray => Some(FieldType::DateTime),
            _ => None,
        }
    }

    /// Column type a ClickHouse-style store would use for this field.
    ///
    /// `None` for `Unknown`, which never becomes a column.
    pub fn clickhouse_type(self) -> Option<&'static str> {
        match self {
            FieldType::Unknown => None,
            FieldType::Int => Some("Int64"),
            FieldType::Float => Some("Float64"),
            FieldType::String => Some("String"),
            FieldType::DateTime => Some("DateTime64(3)"),
            FieldType::IntArray => Some("Array(Int64)"),
            FieldType::FloatArray => Some("Array(Float64)"),
            FieldType::StringArray => Some("Array(String)"),
            FieldType::DateTimeArray => Some("Array(DateTime64(3))"),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Unknown => write!(f, "unknown"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::String => write!(f, "string"),
            FieldType::DateTime => write!(f, "date_time"),
            FieldType::IntArray => write!(f, "int_array"),
            FieldType::FloatArray => write!(f, "float_array"),
            FieldType::StringArray => write!(f, "string_array"),
            FieldType::DateTimeArray => write!(f, "date_time_array"),
        }
    }
}

// ============================================================================
// Column Values
// ============================================================================

/// Typed sequence returned by the array getter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnArray {
    Int(Vec<i64>),
    Float(Vec<f64>),
    String(Vec<String>),
    DateTime(Vec<DateTime<Utc>>),
}

impl ColumnArray {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            ColumnArray::Int(v) => v.len(),
            ColumnArray::Float(v) => v.len(),
            ColumnArray::String(v) => v.len(),
            ColumnArray::DateTime(v) => v.len(),
        }
    }

    /// Whether the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type of the sequence
    pub fn element_type(&self) -> FieldType {
        match self {
            ColumnArray::Int(_) => FieldType::Int,
            ColumnArray::Float(_) => FieldType::Float,
            ColumnArray::String(_) => FieldType::String,
            ColumnArray::DateTime(_) => FieldType::DateTime,
        }
    }
}

/// One typed value ready to be inserted into a column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Array(ColumnArray),
}

impl ColumnValue {
    /// Whether this is the SQL NULL value
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}

impl From<Option<i64>> for ColumnValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(ColumnValue::Null, ColumnValue::Int)
    }
}

impl From<Option<f64>> for ColumnValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(ColumnValue::Null, ColumnValue::Float)
    }
}

impl From<Option<String>> for ColumnValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(ColumnValue::Null, ColumnValue::String)
    }
}

impl From<Option<DateTime<Utc>>> for ColumnValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(ColumnValue::Null, ColumnValue::DateTime)
    }
}

impl From<ColumnArray> for ColumnValue {
    fn from(value: ColumnArray) -> Self {
        ColumnValue::Array(value)
    }
}
