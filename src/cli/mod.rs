//! CLI module
//!
//! Command-line interface for querying tables.
//!
//! # Commands
//!
//! - `tables` - List available tables
//! - `columns` - Show the columns of a table
//! - `query` - List or get rows
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve};
