// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # github-tables
//!
//! Query GitHub releases, Actions workflows and repositories as flat rows.
//!
//! ## Features
//!
//! - **Rate-limit aware fetching**: rate-limited calls are retried on a
//!   Fibonacci backoff schedule, everything else fails fast
//! - **Link header pagination**: pages are followed until exhausted, the row
//!   limit is reached, or the query is cancelled
//! - **Ignorable errors**: tables declare which error codes mean "no rows"
//! - **GitHub Enterprise**: alternate endpoints via `base_url`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use github_tables::{CollectingSink, Connection, ConnectionConfig, Plugin, Query, Row};
//!
//! #[tokio::main]
//! async fn main() -> github_tables::Result<()> {
//!     let plugin = Plugin::new(Connection::new(ConnectionConfig::default()));
//!
//!     let query = Query::new()
//!         .qual("repository_full_name", "rust-lang/rust")
//!         .limit(10);
//!     let mut sink = CollectingSink::<Row>::new();
//!     plugin.list("github_release", &query, &mut sink).await?;
//!
//!     for row in sink.items() {
//!         println!("{}", row["tag_name"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Plugin (tables, list, get)                   │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────┬─────────────────┴──┬──────────────┬────────────┐
//! │   Tables   │     Paginator      │   Fetcher    │   Sinks    │
//! ├────────────┼────────────────────┼──────────────┼────────────┤
//! │ release    │ Link header cursor │ Retry policy │ Collecting │
//! │ workflow   │ Page size / limit  │ Fibonacci    │ Streaming  │
//! │ repository │ Cancellation       │ Ignore codes │ Bounded    │
//! └────────────┴────────────────────┴──────────────┴────────────┘
//!                                │
//!            GitHubClient → HttpClient (auth, throttling)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Connection configuration
pub mod config;

/// HTTP client with rate limiting
pub mod http;

/// Retrying fetch executor
pub mod fetch;

/// Page-cursor pagination
pub mod pagination;

/// Row sinks
pub mod sink;

/// GitHub REST client and payloads
pub mod github;

/// Lazily built API connection
pub mod connection;

/// Table definitions and query dispatch
pub mod tables;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ConnectionConfig;
pub use connection::Connection;
pub use fetch::{Fetcher, IgnorePredicate, RetryPolicy};
pub use pagination::Paginator;
pub use sink::{CollectingSink, RowSink, StreamingSink};
pub use tables::{Plugin, Query, Table};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
