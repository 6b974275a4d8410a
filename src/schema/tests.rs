//! Schema discovery tests

use super::*;
use crate::config::TableConfig;
use crate::datetime::DateTimeParser;
use crate::metric::ColumnDef;
use crate::parser::{JsonParser, ParseContext, ParserPool};
use crate::types::{FieldType, JsonValue};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

fn parser() -> JsonParser {
    JsonParser::new(Arc::new(ParseContext::default()))
}

fn discover(tracker: &SchemaTracker, parser: &mut JsonParser, record: JsonValue) -> bool {
    let buffer = record.to_string();
    let metric = parser.parse(buffer.as_bytes()).unwrap();
    tracker.discover(&metric)
}

// ============================================================================
// Type Detection
// ============================================================================

#[test_case(json!(42), FieldType::Int ; "integer")]
#[test_case(json!(-1), FieldType::Int ; "negative integer")]
#[test_case(json!(3.0), FieldType::Int ; "whole float")]
#[test_case(json!(42.5), FieldType::Float ; "fractional")]
#[test_case(json!(1e30), FieldType::Float ; "beyond i64")]
#[test_case(serde_json::from_str("-9223372036854775809").unwrap(), FieldType::Float ; "below i64 min")]
#[test_case(serde_json::from_str("-9223372036854775808").unwrap(), FieldType::Int ; "i64 min")]
#[test_case(json!(true), FieldType::Int ; "json true")]
#[test_case(json!(false), FieldType::Int ; "json false")]
#[test_case(json!("hello"), FieldType::String ; "plain string")]
#[test_case(json!(""), FieldType::String ; "empty string")]
#[test_case(json!("2021-01-02T15:04:05Z"), FieldType::DateTime ; "rfc3339 string")]
#[test_case(json!("2021-01-02"), FieldType::DateTime ; "date string")]
#[test_case(json!(null), FieldType::Unknown ; "null")]
#[test_case(json!({"a": 1}), FieldType::String ; "object")]
#[test_case(json!([1, 2, 3]), FieldType::IntArray ; "int array")]
#[test_case(json!([1.5, 2]), FieldType::FloatArray ; "float array")]
#[test_case(json!(["a", 1]), FieldType::StringArray ; "string array typed by first")]
#[test_case(json!(["2021-01-02", "x"]), FieldType::DateTimeArray ; "date time array")]
#[test_case(json!([true]), FieldType::IntArray ; "bool array")]
#[test_case(json!([{"a": 1}]), FieldType::StringArray ; "object array")]
#[test_case(json!([]), FieldType::Unknown ; "empty array")]
#[test_case(json!([null, 1]), FieldType::Unknown ; "null first element")]
#[test_case(json!([[1]]), FieldType::Unknown ; "nested array")]
fn test_detect_type(value: JsonValue, expected: FieldType) {
    let datetimes = DateTimeParser::default();
    assert_eq!(detect_type(&value, &datetimes), expected);
}

#[test]
fn test_detect_type_is_deterministic() {
    let datetimes = DateTimeParser::default();
    let value = json!(["2021-01-02", 1]);
    let first = detect_type(&value, &datetimes);
    for _ in 0..10 {
        assert_eq!(detect_type(&value, &datetimes), first);
    }
}

#[test]
fn test_detect_type_uses_configured_layouts() {
    let datetimes = DateTimeParser::new(
        vec![crate::datetime::Layout::new("%d.%m.%Y")],
        crate::datetime::Timezone::Utc,
    );
    assert_eq!(detect_type(&json!("02.01.2021"), &datetimes), FieldType::DateTime);
    assert_eq!(detect_type(&json!("2021-01-02"), &datetimes), FieldType::String);
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_discover_twice_reports_only_first_time() {
    let tracker = SchemaTracker::new("events");
    let mut parser = parser();
    let record = json!({"id": 1, "name": "a", "ts": "2021-01-02T15:04:05Z", "tags": ["x"]});

    assert!(discover(&tracker, &mut parser, record.clone()));
    assert!(!discover(&tracker, &mut parser, record));

    assert_eq!(
        tracker.pending(),
        vec![
            NewField::new("id", FieldType::Int),
            NewField::new("name", FieldType::String),
            NewField::new("tags", FieldType::StringArray),
            NewField::new("ts", FieldType::DateTime),
        ]
    );
    assert_eq!(tracker.known_len(), 4);
}

#[test]
fn test_ambiguous_type_is_not_sticky() {
    let tracker = SchemaTracker::new("events");
    let mut parser = parser();

    assert!(!discover(&tracker, &mut parser, json!({"when": null})));
    assert!(!tracker.is_known("when"));
    assert_eq!(tracker.pending_len(), 0);

    assert!(discover(&tracker, &mut parser, json!({"when": "2021-01-02"})));
    assert!(tracker.is_known("when"));
    assert_eq!(tracker.new_keys().get("when"), Some(FieldType::DateTime));
}

#[test]
fn test_empty_array_is_retried() {
    let tracker = SchemaTracker::new("events");
    let mut parser = parser();

    assert!(!discover(&tracker, &mut parser, json!({"ids": []})));
    assert!(!tracker.is_known("ids"));

    assert!(discover(&tracker, &mut parser, json!({"ids": [7]})));
    assert_eq!(tracker.new_keys().get("ids"), Some(FieldType::IntArray));
}

#[test]
fn test_known_type_is_not_revised() {
    let tracker = SchemaTracker::new("events");
    let mut parser = parser();

    assert!(discover(&tracker, &mut parser, json!({"v": 1})));
    assert!(!discover(&tracker, &mut parser, json!({"v": 1.5})));
    assert_eq!(tracker.new_keys().get("v"), Some(FieldType::Int));
}

#[test]
fn test_deny_pattern_marks_known_but_never_new() {
    let filter = KeyFilter::new(None, Some("^debug_")).unwrap();
    let tracker = SchemaTracker::new("events").with_filter(filter);
    let mut parser = parser();

    for i in 0..5 {
        let found = discover(&tracker, &mut parser, json!({"debug_trace": i, "user": "u"}));
        assert_eq!(found, i == 0);
    }

    assert!(tracker.is_known("debug_trace"));
    assert!(!tracker.new_keys().contains("debug_trace"));
    assert_eq!(tracker.pending(), vec![NewField::new("user", FieldType::String)]);
}

#[test]
fn test_allow_pattern_rejects_non_matching() {
    let filter = KeyFilter::new(Some("^[a-z_]+$"), None).unwrap();
    let tracker = SchemaTracker::new("events").with_filter(filter);
    let mut parser = parser();

    assert!(discover(&tracker, &mut parser, json!({"ok_field": 1, "@meta": 2, "Upper": 3})));
    assert_eq!(tracker.pending(), vec![NewField::new("ok_field", FieldType::Int)]);
    assert!(tracker.is_known("@meta"));
    assert!(tracker.is_known("Upper"));
}

#[test]
fn test_filtered_null_field_is_still_known() {
    let filter = KeyFilter::new(None, Some("^x$")).unwrap();
    let tracker = SchemaTracker::new("events").with_filter(filter);
    let mut parser = parser();

    assert!(!discover(&tracker, &mut parser, json!({"x": null})));
    assert!(tracker.is_known("x"));
}

#[test]
fn test_seeded_keys_are_not_discovered() {
    let tracker = SchemaTracker::new("events");
    tracker.seed_known(["id", "ts"]);
    let mut parser = parser();

    assert!(discover(&tracker, &mut parser, json!({"id": 1, "ts": 2, "extra": "e"})));
    assert_eq!(tracker.pending(), vec![NewField::new("extra", FieldType::String)]);
}

#[test]
fn test_drain_empties_pending_but_keeps_known() {
    let tracker = SchemaTracker::new("events");
    let mut parser = parser();
    discover(&tracker, &mut parser, json!({"a": 1, "b": 2.5}));

    let drained = tracker.drain_new_keys();
    assert_eq!(
        drained,
        vec![
            NewField::new("a", FieldType::Int),
            NewField::new("b", FieldType::Float),
        ]
    );
    assert_eq!(tracker.pending_len(), 0);
    assert!(tracker.drain_new_keys().is_empty());

    assert!(!discover(&tracker, &mut parser, json!({"a": 1, "b": 2.5})));
    assert!(discover(&tracker, &mut parser, json!({"c": "x"})));
    assert_eq!(tracker.drain_new_keys(), vec![NewField::new("c", FieldType::String)]);
}

#[test]
fn test_discover_new_keys_free_function() {
    let known = KnownKeys::new();
    let new = NewKeys::new();
    let filter = KeyFilter::none();
    let mut parser = parser();

    let metric = parser.parse(br#"{"a": 1, "b": null}"#).unwrap();
    assert!(discover_new_keys(&metric, &known, &new, &filter));
    assert!(!discover_new_keys(&metric, &known, &new, &filter));

    assert_eq!(known.to_vec(), vec!["a".to_string()]);
    assert_eq!(new.len(), 1);
}

#[test]
fn test_from_table_seeds_columns_and_filter() {
    let table = TableConfig {
        name: "access_log".to_string(),
        allow: None,
        deny: Some("^_".to_string()),
        columns: vec![
            ColumnDef::new("bytes", FieldType::Int),
            ColumnDef::new("ts", FieldType::DateTime).with_source("@timestamp"),
        ],
    };
    let tracker = SchemaTracker::from_table(&table).unwrap();
    let mut parser = parser();

    assert_eq!(tracker.table(), "access_log");
    assert!(tracker.is_known("bytes"));
    assert!(tracker.is_known("@timestamp"));
    assert!(!tracker.filter().is_empty());

    assert!(discover(
        &tracker,
        &mut parser,
        json!({"bytes": 1, "@timestamp": 2, "_internal": 3, "verb": "GET"})
    ));
    assert_eq!(tracker.pending(), vec![NewField::new("verb", FieldType::String)]);
}

// ============================================================================
// Key Sets and Filters
// ============================================================================

#[test]
fn test_known_keys_insert_once() {
    let known = KnownKeys::new();
    assert!(known.insert("a"));
    assert!(!known.insert("a"));
    assert!(known.contains("a"));
    assert_eq!(known.len(), 1);
}

#[test]
fn test_known_keys_from_iter() {
    let known: KnownKeys = ["b", "a", "b"].into_iter().collect();
    assert_eq!(known.to_vec(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_key_filter_admits() {
    let filter = KeyFilter::new(Some("^log_"), Some("_tmp$")).unwrap();
    assert!(filter.admits("log_level"));
    assert!(!filter.admits("level"));
    assert!(!filter.admits("log_tmp"));

    assert!(KeyFilter::none().admits("anything"));
    assert!(KeyFilter::none().is_empty());
}

#[test]
fn test_key_filter_invalid_pattern() {
    let err = KeyFilter::new(Some("(unclosed"), None).unwrap_err();
    assert!(matches!(err, crate::Error::InvalidPattern { .. }));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_disjoint_keys_none_lost() {
    const WORKERS: usize = 8;
    const RECORDS: usize = 200;
    const KEYS_PER_RECORD: usize = 5;

    let tracker = SchemaTracker::new("events");
    let pool = ParserPool::default();

    std::thread::scope(|scope| {
        for worker in 0..WORKERS {
            let tracker = &tracker;
            let pool = &pool;
            scope.spawn(move || {
                let mut parser = pool.get();
                for record in 0..RECORDS {
                    let mut object = serde_json::Map::new();
                    for k in 0..KEYS_PER_RECORD {
                        object.insert(format!("w{worker}_r{record}_k{k}"), json!(k));
                    }
                    let buffer = JsonValue::Object(object).to_string();
                    let metric = parser.parse(buffer.as_bytes()).unwrap();
                    assert!(tracker.discover(&metric));
                }
            });
        }
    });

    let fields = tracker.drain_new_keys();
    assert_eq!(fields.len(), WORKERS * RECORDS * KEYS_PER_RECORD);
    assert!(fields.iter().all(|f| f.field_type == FieldType::Int));
    assert_eq!(tracker.known_len(), WORKERS * RECORDS * KEYS_PER_RECORD);
}

#[test]
fn test_concurrent_shared_keys_inserted_once() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WORKERS: usize = 8;
    const KEYS: usize = 100;

    let tracker = SchemaTracker::new("events");
    let pool = ParserPool::default();
    let wins = AtomicUsize::new(0);

    let mut object = serde_json::Map::new();
    for k in 0..KEYS {
        object.insert(format!("shared_{k}"), json!("value"));
    }
    let buffer = JsonValue::Object(object).to_string();

    std::thread::scope(|scope| {
        for _ in 0..WORKERS {
            let (tracker, pool, wins, buffer) = (&tracker, &pool, &wins, &buffer);
            scope.spawn(move || {
                let mut parser = pool.get();
                for _ in 0..10 {
                    let metric = parser.parse(buffer.as_bytes()).unwrap();
                    if tracker.discover(&metric) {
                        wins.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    assert_eq!(tracker.pending_len(), KEYS);
    assert_eq!(tracker.known_len(), KEYS);
    assert!(wins.load(Ordering::Relaxed) >= 1);
    assert!(wins.load(Ordering::Relaxed) <= KEYS.min(WORKERS * 10));
}
