//! Table definitions
//!
//! # Overview
//!
//! Each table maps one GitHub resource onto flat rows:
//! - `github_release`: releases of a repository
//! - `github_repository`: repositories of an owner
//! - `github_workflow`: Actions workflows of a repository
//!
//! A table declares the quals it needs for listing and for single-row gets,
//! plus which error codes mean "no rows" rather than failure. [`Plugin`]
//! dispatches queries to the right table and drives pagination.

mod plugin;
pub mod release;
pub mod repository;
pub mod transform;
mod types;
pub mod workflow;

pub use plugin::{Plugin, TableSource};
pub use transform::parse_repo_full_name;
pub use types::{Column, ColumnType, Query, Table};
