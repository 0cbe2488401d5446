//! Raw Response Module
//!
//! Captures what came back from the upstream before any shaping happens.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::fetch::FetchError;

// == Raw Response ==
/// Status, headers, and body of one upstream reply.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Value of the `Retry-After` header, when present as whole seconds.
    ///
    /// HTTP-date forms and unparsable values read as absent.
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    /// Decodes the body as JSON.
    ///
    /// # Returns
    /// * `Ok(T)` - The decoded payload
    /// * `Err(FetchError::Parse)` - Body was not valid JSON for `T`
    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::Parse {
            status: self.status,
            source: e,
        })
    }
}
