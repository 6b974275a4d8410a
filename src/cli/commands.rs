//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Record parsing and schema discovery CLI
#[derive(Parser, Debug)]
#[command(name = "sinker-parse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find fields the table does not have yet and infer their types
    Discover {
        /// Table from the configuration file
        #[arg(short, long)]
        table: String,

        /// JSON lines input (`-` or absent = stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Concurrent workers
        #[arg(short, long, default_value = "4")]
        workers: usize,

        /// Records handed to a worker at once
        #[arg(long, default_value = "256")]
        batch_size: usize,
    },

    /// Extract one typed row per record using the table's columns
    Extract {
        /// Table from the configuration file
        #[arg(short, long)]
        table: String,

        /// JSON lines input (`-` or absent = stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show the detected type of every field of each record
    Detect {
        /// JSON lines input (`-` or absent = stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Parse a date/time string with the configured layouts
    Datetime {
        /// Value to parse
        value: String,
    },

    /// List the effective date/time layouts in priority order
    Layouts,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
