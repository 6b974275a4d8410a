//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, SinkerConfig};
use crate::error::{Error, Result, ResultExt};
use crate::parser::{JsonParser, ParserPool};
use crate::schema::SchemaTracker;
use crate::worker::WorkerPool;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

/// Record counts shared by discovery workers
#[derive(Debug, Default)]
struct Counters {
    records: AtomicUsize,
    malformed: AtomicUsize,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Discover {
                table,
                input,
                workers,
                batch_size,
            } => {
                self.discover(table, input.as_deref(), *workers, *batch_size)
                    .await
            }
            Commands::Extract { table, input } => self.extract(table, input.as_deref()),
            Commands::Detect { input } => self.detect(input.as_deref()),
            Commands::Datetime { value } => self.datetime(value),
            Commands::Layouts => self.layouts(),
        }
    }

    /// Load configuration, falling back to defaults when no file is given
    fn load_config(&self) -> Result<SinkerConfig> {
        match &self.cli.config {
            Some(path) => load_config(path),
            None => Ok(SinkerConfig::default()),
        }
    }

    /// Run discovery over the input with a bounded worker pool
    async fn discover(
        &self,
        table: &str,
        input: Option<&Path>,
        workers: usize,
        batch_size: usize,
    ) -> Result<()> {
        let config = self.load_config()?;
        let table_config = config.table(table)?;
        let batch_size = batch_size.max(1);

        let parsers = Arc::new(ParserPool::new(config.parse_context()?));
        let tracker = Arc::new(SchemaTracker::from_table(table_config)?);
        let counters = Arc::new(Counters::default());
        let mut pool = WorkerPool::new(workers);
        let started = Instant::now();

        let mut batch = Vec::with_capacity(batch_size);
        for line in open_input(input)?.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            batch.push(line);
            if batch.len() >= batch_size {
                let lines = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                pool.submit(discover_batch(&parsers, &tracker, &counters, lines))
                    .await?;
            }
        }
        if !batch.is_empty() {
            pool.submit(discover_batch(&parsers, &tracker, &counters, batch))
                .await?;
        }
        pool.join().await?;

        let records = counters.records.load(Ordering::Relaxed);
        let malformed = counters.malformed.load(Ordering::Relaxed);
        info!(
            table,
            records,
            malformed,
            parsers = parsers.created(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "discovery finished"
        );

        let fields: Vec<Value> = tracker
            .drain_new_keys()
            .into_iter()
            .map(|field| {
                json!({
                    "name": field.name,
                    "type": field.field_type,
                    "store_type": field.field_type.clickhouse_type()
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "NEW_FIELDS",
            "table": table,
            "records": records,
            "malformed": malformed,
            "fields": fields
        }));

        Ok(())
    }

    /// Print one typed row per record
    fn extract(&self, table: &str, input: Option<&Path>) -> Result<()> {
        let config = self.load_config()?;
        let table_config = config.table(table)?;
        let mut parser = JsonParser::new(Arc::new(config.parse_context()?));

        for (index, line) in open_input(input)?.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let metric = match parser.parse(line.as_bytes()) {
                Ok(metric) => metric,
                Err(e) if e.is_record_error() => {
                    self.skip_record(index + 1, &e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mut row = Map::new();
            for column in &table_config.columns {
                row.insert(column.name.clone(), output_value(&metric.get_value(column))?);
            }

            self.output_message(&json!({
                "type": "ROW",
                "table": table,
                "row": row
            }));
        }

        Ok(())
    }

    /// Print the detected type of every field of each record
    fn detect(&self, input: Option<&Path>) -> Result<()> {
        let config = self.load_config()?;
        let mut parser = JsonParser::new(Arc::new(config.parse_context()?));

        for (index, line) in open_input(input)?.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let metric = match parser.parse(line.as_bytes()) {
                Ok(metric) => metric,
                Err(e) if e.is_record_error() => {
                    self.skip_record(index + 1, &e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let fields: Map<String, Value> = metric
                .keys()
                .filter_map(|key| {
                    metric
                        .detect_type(key)
                        .map(|field_type| (key.to_string(), json!(field_type)))
                })
                .collect();

            self.output_message(&json!({
                "type": "RECORD_TYPES",
                "line": index + 1,
                "fields": fields
            }));
        }

        Ok(())
    }

    /// Try the configured layouts on one value
    fn datetime(&self, value: &str) -> Result<()> {
        let context = self.load_config()?.parse_context()?;
        let datetimes = context.datetimes();

        let message = match datetimes.parse(value) {
            Some((parsed, layout)) => json!({
                "type": "DATETIME",
                "value": value,
                "matched": true,
                "layout": layout.name(),
                "timezone": datetimes.timezone().to_string(),
                "utc": parsed.to_rfc3339(),
                "unix_millis": parsed.timestamp_millis()
            }),
            None => json!({
                "type": "DATETIME",
                "value": value,
                "matched": false
            }),
        };
        self.output_message(&message);

        Ok(())
    }

    /// List the effective layouts
    fn layouts(&self) -> Result<()> {
        let config = self.load_config()?;
        let layouts: Vec<String> = config.layouts().iter().map(ToString::to_string).collect();

        self.output_message(&json!({
            "type": "LAYOUTS",
            "timezone": config.timezone.to_string(),
            "layouts": layouts
        }));

        Ok(())
    }

    /// Report a record that could not be parsed
    fn skip_record(&self, line: usize, err: &Error) {
        warn!(line, error = %err, "skipping malformed record");
        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "WARN",
                "message": format!("Skipping malformed record on line {line}: {err}")
            }
        }));
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Open a JSON lines input; `-` or no path reads stdin
fn open_input(input: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match input {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input '{}'", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

/// Serialize a value for output.
///
/// Failures here are output errors, never record errors.
fn output_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to serialize output")
}

/// Build the task that runs discovery over one batch of lines
fn discover_batch(
    parsers: &Arc<ParserPool>,
    tracker: &Arc<SchemaTracker>,
    counters: &Arc<Counters>,
    lines: Vec<String>,
) -> impl FnOnce() + Send + 'static {
    let parsers = Arc::clone(parsers);
    let tracker = Arc::clone(tracker);
    let counters = Arc::clone(counters);

    move || {
        let mut parser = parsers.get();
        for line in &lines {
            match parser.parse(line.as_bytes()) {
                Ok(metric) => {
                    tracker.discover(&metric);
                    counters.records.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    warn!(error = %e, "skipping malformed record");
                    counters.malformed.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}
