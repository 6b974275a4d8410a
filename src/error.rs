//! Error types for sinker-parse
//!
//! Only buffer-level failures and configuration problems are errors here.
//! Field-level coercion mismatches never surface as errors: getters degrade
//! to typed defaults instead.

use thiserror::Error;

/// The main error type for sinker-parse
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid timezone '{0}', expected UTC, Local or an offset like +08:00")]
    InvalidTimezone(String),

    #[error("Table '{table}' not found in configuration")]
    TableNotFound { table: String },

    // ============================================================================
    // Record Errors
    // ============================================================================
    #[error("Failed to parse record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Record is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },

    // ============================================================================
    // Runtime Errors
    // ============================================================================
    #[error("Worker task failed: {message}")]
    Worker { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a table-not-found error
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }

    /// Create a worker error
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    /// Whether the error concerns a single record rather than the process.
    ///
    /// Record errors are reported and the record dropped; everything else
    /// stops the pipeline.
    pub fn is_record_error(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::NotAnObject { .. })
    }
}

/// Result type alias for sinker-parse
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::table_not_found("events");
        assert_eq!(err.to_string(), "Table 'events' not found in configuration");

        let err = Error::NotAnObject { found: "array" };
        assert_eq!(err.to_string(), "Record is not a JSON object (found array)");
    }

    #[test]
    fn test_is_record_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(Error::Parse(parse_err).is_record_error());
        assert!(Error::NotAnObject { found: "string" }.is_record_error());

        assert!(!Error::config("bad").is_record_error());
        assert!(!Error::worker("panicked").is_record_error());
    }

    #[test]
    fn test_invalid_pattern_display() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = Error::invalid_pattern("(", source);
        assert!(err.to_string().starts_with("Invalid pattern '(':"));
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
