//! JSON record parser

use super::context::ParseContext;
use crate::error::{Error, Result};
use crate::metric::Metric;
use crate::types::JsonValue;
use std::sync::Arc;

/// Parses raw buffers into [`Metric`]s.
///
/// One instance per worker. The returned `Metric` borrows the parser, so the
/// previous record must be fully consumed before the next `parse` call.
#[derive(Debug)]
pub struct JsonParser {
    context: Arc<ParseContext>,
    value: JsonValue,
    parsed: u64,
}

impl JsonParser {
    /// Create a parser sharing `context` with its siblings
    pub fn new(context: Arc<ParseContext>) -> Self {
        Self {
            context,
            value: JsonValue::Null,
            parsed: 0,
        }
    }

    /// Parse one record.
    ///
    /// Fails on malformed input and on valid JSON whose top level is not an
    /// object. The previously parsed record is released either way.
    pub fn parse(&mut self, bytes: &[u8]) -> Result<Metric<'_>> {
        self.value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(e) => {
                self.value = JsonValue::Null;
                return Err(Error::Parse(e));
            }
        };

        match &self.value {
            JsonValue::Object(object) => {
                self.parsed += 1;
                Ok(Metric::new(object, &self.context))
            }
            other => Err(Error::NotAnObject {
                found: value_kind(other),
            }),
        }
    }

    pub fn context(&self) -> &Arc<ParseContext> {
        &self.context
    }

    /// Number of records this parser decoded successfully
    pub fn parsed_count(&self) -> u64 {
        self.parsed
    }

    /// Whether the last parsed record is still held
    pub fn holds_record(&self) -> bool {
        !self.value.is_null()
    }

    /// Release the last parsed record
    pub(crate) fn clear(&mut self) {
        self.value = JsonValue::Null;
    }
}

/// Name of a value's JSON type
pub fn value_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
