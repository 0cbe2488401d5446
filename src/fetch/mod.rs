//! Fetch Module
//!
//! HTTP access to the upstream catalog with retries, backoff, and rate
//! limit handling.

mod client;
mod error;
mod response;
mod transport;

// Re-export public types
pub use client::{Fetcher, DEFAULT_MAX_RETRIES};
pub use error::FetchError;
pub use response::RawResponse;
pub use transport::{ApiRequest, FetchOptions, HttpTransport, Transport};
