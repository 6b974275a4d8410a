//! Per-value coercion rules shared by the getters and the type detector

use crate::parser::ParseContext;
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use serde_json::Number;

/// Decode a JSON number as an integer.
///
/// Succeeds for integers within `i64` and for floats with no fractional part
/// within `i64` (`3.0`). Fractional values and anything beyond `i64` fail.
pub(crate) fn decode_int(number: &Number) -> Option<i64> {
    if let Some(n) = number.as_i64() {
        return Some(n);
    }
    if number.is_u64() {
        // Positive integer beyond i64::MAX
        return None;
    }
    // i64::MIN itself arrives through as_i64; anything at or below it as a
    // float has overflowed
    number
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f > i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
}

/// String form of a value: strings verbatim, everything else as compact JSON
pub(crate) fn render(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Interpret a value as an instant.
///
/// Numbers are Unix timestamps in the context's unit; non-empty strings go
/// through the layout parser with `key` as the cache key.
pub(crate) fn to_datetime(
    value: &JsonValue,
    key: &str,
    context: &ParseContext,
) -> Option<DateTime<Utc>> {
    match value {
        JsonValue::Number(n) => n
            .as_f64()
            .and_then(|f| context.time_unit().to_datetime(f)),
        JsonValue::String(s) if !s.is_empty() => context.datetimes().parse_field(key, s),
        _ => None,
    }
}
