//! HTTP client module
//!
//! Provides the reqwest-based client used by the API transport.
//!
//! # Features
//!
//! - **Automatic Retries**: 429/5xx, timeouts and connection errors are retried
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Retry-After**: Honoured on 429 responses, capped at the max backoff

mod client;

pub use client::{
    response_metadata, HttpClient, HttpClientConfig, HttpClientConfigBuilder, DEFAULT_BASE_URL,
};

#[cfg(test)]
mod tests;
