//! HTTP client module
//!
//! Provides the reqwest-backed client used as a page source.
//!
//! # Features
//!
//! - **Bearer Auth**: Attaches an access token to every request
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Retries**: Constant, linear, and exponential backoff (disabled by default)
//! - **Link Pagination**: Returns the parsed `Link` header alongside items

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
