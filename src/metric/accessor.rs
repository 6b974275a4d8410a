//! Typed field accessors over one parsed record

use super::coerce::{decode_int, render, to_datetime};
use super::row::ColumnDef;
use crate::parser::ParseContext;
use crate::schema::detect_type;
use crate::types::{ColumnArray, ColumnValue, FieldType, JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use tracing::error;

/// Read-only typed view of one record.
///
/// Getters never fail: a missing field, a null, or a value of the wrong JSON
/// type yields `None` when `nullable` is set and the type's zero value
/// otherwise (`""`, `0`, `0.0`, the epoch sentinel). Non-nullable calls
/// always return `Some`.
#[derive(Debug, Clone, Copy)]
pub struct Metric<'a> {
    object: &'a JsonObject,
    context: &'a ParseContext,
}

impl<'a> Metric<'a> {
    /// Bind a view to a parsed top-level object
    pub fn new(object: &'a JsonObject, context: &'a ParseContext) -> Self {
        Self { object, context }
    }

    /// The underlying object
    pub fn object(&self) -> &'a JsonObject {
        self.object
    }

    pub fn context(&self) -> &'a ParseContext {
        self.context
    }

    /// Raw value of a field
    pub fn get(&self, key: &str) -> Option<&'a JsonValue> {
        self.object.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.object.contains_key(key)
    }

    /// Top-level field names
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.object.keys().map(String::as_str)
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.object.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object.is_empty()
    }

    /// Inferred type of one field, `None` if the field is missing
    pub fn detect_type(&self, key: &str) -> Option<FieldType> {
        self.get(key)
            .map(|value| detect_type(value, self.context.datetimes()))
    }

    // ========================================================================
    // Scalar getters
    // ========================================================================

    /// String field. JSON strings are returned verbatim, other types in their
    /// compact JSON form.
    pub fn get_string(&self, key: &str, nullable: bool) -> Option<String> {
        match self.get(key) {
            None | Some(JsonValue::Null) => default_value(nullable, String::new()),
            Some(value) => Some(render(value)),
        }
    }

    /// Float field. Only JSON numbers are accepted.
    pub fn get_float(&self, key: &str, nullable: bool) -> Option<f64> {
        match self.get(key) {
            Some(JsonValue::Number(n)) => n.as_f64().or_else(|| default_value(nullable, 0.0)),
            _ => default_value(nullable, 0.0),
        }
    }

    /// Integer field. Booleans map to 1/0; numbers must decode as integers.
    pub fn get_int(&self, key: &str, nullable: bool) -> Option<i64> {
        match self.get(key) {
            Some(JsonValue::Bool(b)) => Some(i64::from(*b)),
            Some(JsonValue::Number(n)) => decode_int(n).or_else(|| default_value(nullable, 0)),
            _ => default_value(nullable, 0),
        }
    }

    /// Date/time field from a Unix timestamp number or a recognized string
    pub fn get_date_time(&self, key: &str, nullable: bool) -> Option<DateTime<Utc>> {
        self.get(key)
            .and_then(|value| to_datetime(value, key, self.context))
            .or_else(|| default_value(nullable, self.context.epoch_sentinel()))
    }

    /// Date/time field as Unix seconds
    pub fn get_elastic_date_time(&self, key: &str, nullable: bool) -> Option<i64> {
        self.get_date_time(key, nullable).map(|ts| ts.timestamp())
    }

    // ========================================================================
    // Array getter
    // ========================================================================

    /// Array field with every element coerced to `element_type`.
    ///
    /// A missing or non-array field yields an empty sequence.
    ///
    /// # Panics
    ///
    /// Panics when `element_type` is not one of `Int`, `Float`, `String` or
    /// `DateTime`. That is a caller bug, not bad data.
    pub fn get_array(&self, key: &str, element_type: FieldType) -> ColumnArray {
        let elements: &[JsonValue] = match self.get(key) {
            Some(JsonValue::Array(items)) => items,
            _ => &[],
        };

        match element_type {
            FieldType::Int => ColumnArray::Int(
                elements
                    .iter()
                    .map(|e| match e {
                        JsonValue::Bool(true) => 1,
                        JsonValue::Number(n) => decode_int(n).unwrap_or(0),
                        _ => 0,
                    })
                    .collect(),
            ),
            FieldType::Float => {
                ColumnArray::Float(elements.iter().map(|e| e.as_f64().unwrap_or(0.0)).collect())
            }
            FieldType::String => ColumnArray::String(
                elements
                    .iter()
                    .map(|e| match e {
                        JsonValue::Null => String::new(),
                        other => render(other),
                    })
                    .collect(),
            ),
            FieldType::DateTime => {
                let epoch = self.context.epoch_sentinel();
                ColumnArray::DateTime(
                    elements
                        .iter()
                        .map(|e| to_datetime(e, key, self.context).unwrap_or(epoch))
                        .collect(),
                )
            }
            unsupported => {
                error!(field = key, element_type = %unsupported, "unsupported array element type");
                panic!("LOGIC ERROR: unsupported array element type {unsupported}");
            }
        }
    }

    // ========================================================================
    // Column extraction
    // ========================================================================

    /// Value for one destination column
    pub fn get_value(&self, column: &ColumnDef) -> ColumnValue {
        let key = column.source_key();
        let nullable = column.nullable;
        match column.field_type {
            FieldType::Int => self.get_int(key, nullable).into(),
            FieldType::Float => self.get_float(key, nullable).into(),
            FieldType::String => self.get_string(key, nullable).into(),
            FieldType::DateTime => self.get_date_time(key, nullable).into(),
            other => {
                let element = other.element_type().unwrap_or(FieldType::Unknown);
                self.get_array(key, element).into()
            }
        }
    }

    /// One value per column, in column order
    pub fn extract_row(&self, columns: &[ColumnDef]) -> Vec<ColumnValue> {
        columns.iter().map(|column| self.get_value(column)).collect()
    }
}

fn default_value<T>(nullable: bool, zero: T) -> Option<T> {
    if nullable {
        None
    } else {
        Some(zero)
    }
}
