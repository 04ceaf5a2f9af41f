//! HTTP client module
//!
//! Provides the single-attempt HTTP client used by the GitHub API client.
//!
//! # Features
//!
//! - **Bearer Authentication**: Access token sent with every request
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Error Classification**: Not-found, rate-limited and status failures

mod client;
mod rate_limit;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, JsonResponse, RequestConfig,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
