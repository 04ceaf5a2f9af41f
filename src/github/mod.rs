//! GitHub API access
//!
//! [`GitHubClient`] exposes the handful of REST endpoints backing the tables,
//! returning typed payloads from [`types`].

mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::{Release, ReleaseAsset, Repository, User, Workflow, Workflows};
