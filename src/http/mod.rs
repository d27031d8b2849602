//! HTTP module
//!
//! A JSON-over-HTTP fetch collaborator for the merger.
//!
//! # Features
//!
//! - **GraphQL or query string**: parameters go out as GraphQL variables or
//!   as query parameters
//! - **Response mapping**: dot paths to items, cursor, total and has-more
//! - **Automatic Retries**: configurable retry logic with backoff
//! - **Rate Limiting**: token bucket rate limiter using governor

mod client;
mod fetcher;
mod mapping;
mod rate_limit;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig, RetryPolicy,
};
pub use fetcher::{HttpFetcher, RequestShape};
pub use mapping::{lookup_path, ResponseMapping};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
