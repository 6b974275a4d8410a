//! Destination column definitions

use crate::types::FieldType;
use serde::{Deserialize, Serialize};

/// One column of a destination table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name in the store
    pub name: String,

    /// Field name in the record, when it differs from the column name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Column type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether the column accepts NULL
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnDef {
    /// Create a non-nullable column read from the field of the same name
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            source: None,
            field_type,
            nullable: false,
        }
    }

    /// Read the column from a differently named field
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Mark the column nullable
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Record field this column is read from
    pub fn source_key(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }
}
