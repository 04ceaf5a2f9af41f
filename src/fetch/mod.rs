//! Fetch module
//!
//! Retry wrapping for single remote calls.
//!
//! # Overview
//!
//! - [`RetryPolicy`] describes the backoff schedule (Fibonacci by default:
//!   100ms, 100ms, 200ms, 300ms, 500ms, ... for at most 10 tries)
//! - [`Fetcher`] executes a call under the policy, retrying only rate-limit
//!   failures
//! - [`Fetcher::get_item`] is the single-item path, where caller-declared
//!   [`IgnorePredicate`]s turn matching errors into "no item"

mod fetcher;
mod policy;

pub use fetcher::{Fetcher, Getter, IgnorePredicate};
pub use policy::RetryPolicy;

#[cfg(test)]
mod tests;
