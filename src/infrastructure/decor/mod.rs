//! HTTP client for the decoration service
//!
//! Provides:
//! - `DecorClient`: reqwest-based implementation of the lookup and account ports
//! - `TokenBucketRateLimiter`: request throttling
//! - `RetryPolicy`: exponential backoff for transient failures
//! - `DecorApiError`: HTTP error classification

pub mod client;
pub mod errors;
pub mod rate_limiter;
pub mod retry;

pub use client::{DecorClient, DecorClientConfig};
pub use errors::DecorApiError;
pub use rate_limiter::TokenBucketRateLimiter;
pub use retry::RetryPolicy;
