//! Field type detection from a single JSON value

use crate::datetime::DateTimeParser;
use crate::metric::decode_int;
use crate::types::{FieldType, JsonValue};

/// Infer the column type of a value.
///
/// Only the shape of the value matters: null and empty arrays are
/// `Unknown` (retry on a later sample), booleans are integers, whole numbers
/// are `Int`, strings matching a date/time layout are `DateTime`, arrays take
/// the type of their first element, and objects fall back to `String`.
pub fn detect_type(value: &JsonValue, datetimes: &DateTimeParser) -> FieldType {
    match value {
        JsonValue::Null => FieldType::Unknown,
        JsonValue::Bool(_) => FieldType::Int,
        JsonValue::Number(n) => {
            if decode_int(n).is_some() {
                FieldType::Int
            } else {
                FieldType::Float
            }
        }
        JsonValue::String(s) => {
            if datetimes.matches(s) {
                FieldType::DateTime
            } else {
                FieldType::String
            }
        }
        // Nested arrays have no column type, so they stay Unknown
        JsonValue::Array(items) => items.first().map_or(FieldType::Unknown, |first| {
            detect_type(first, datetimes)
                .array_of()
                .unwrap_or(FieldType::Unknown)
        }),
        JsonValue::Object(_) => FieldType::String,
    }
}
