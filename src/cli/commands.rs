//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Query GitHub resources as tables
#[derive(Parser, Debug)]
#[command(name = "github-tables")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connection configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline connection configuration JSON
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Log level (written to stderr)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LogLevel,

    /// Verbose output (same as `--log-level debug`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level after applying `--verbose`
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available tables
    Tables,

    /// Show the columns of a table
    Columns {
        /// Table name
        table: String,
    },

    /// Query rows from a table
    Query {
        /// Table name
        table: String,

        /// Qualifier as column=value (repeatable)
        #[arg(short, long = "qual", value_parser = parse_qual)]
        quals: Vec<(String, String)>,

        /// Maximum rows to return
        #[arg(short, long)]
        limit: Option<u64>,

        /// Fetch a single row by its get keys instead of listing
        #[arg(long)]
        get: bool,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one row per line)
    Json,
    /// Indented JSON
    Pretty,
}

/// Parse `column=value`
fn parse_qual(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected column=value, got '{raw}'")),
    }
}
