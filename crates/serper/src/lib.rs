//! Serper search API client for competitor discovery
//!
//! Outbound calls are retried on network errors, 429 and 5xx with bounded
//! exponential backoff; other 4xx responses fail immediately.

pub mod client;
pub mod error;
pub mod retry;
#[cfg(test)]
mod retry_tests;
pub mod types;

pub use client::{DEFAULT_BASE_URL, SerperClient};
pub use error::SerperError;
pub use retry::RetryPolicy;
pub use types::{OrganicResult, SearchRequest};
