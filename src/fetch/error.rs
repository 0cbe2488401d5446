//! Fetch Error Module
//!
//! Error types for upstream catalog access. Messages stay free of their
//! source text; callers that want the full story walk the source chain.

use reqwest::StatusCode;
use thiserror::Error;

// == Fetch Error ==
/// Failures raised while talking to the upstream catalog.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection-level failure before any status code arrived
    #[error("network error")]
    Network {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Upstream answered with a non-success status
    #[error("upstream returned status {status}")]
    HttpStatus { status: StatusCode },

    /// Upstream asked us to slow down
    #[error("upstream rate limited the request (status {status})")]
    RateLimited {
        status: StatusCode,
        retry_after: Option<u64>,
    },

    /// Body arrived but was not the JSON we expected
    #[error("unexpected payload from upstream (status {status})")]
    Parse {
        status: StatusCode,
        source: serde_json::Error,
    },

    /// Every allowed attempt failed; carries the last error seen
    #[error("all {attempts} fetch attempts failed")]
    RetriesExhausted {
        attempts: u32,
        source: Box<FetchError>,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network {
            source: Box::new(err),
        }
    }
}
