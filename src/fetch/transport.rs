//! Transport Module
//!
//! The HTTP seam between the fetch client and the network. Production runs
//! on reqwest; tests swap in a scripted transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::fetch::{FetchError, RawResponse};

/// Upstream request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// == Api Request ==
/// One fully-resolved upstream request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub url: String,
    pub headers: HeaderMap,
}

// == Fetch Options ==
/// Per-call adjustments layered over the client defaults.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HeaderMap,
}

// == Transport ==
/// Executes one request against the upstream.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, FetchError>;
}

// == Http Transport ==
/// Transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction only fails on TLS backend misconfiguration");
        Self { client }
    }

    #[allow(dead_code)]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(&request.url)
            .headers(request.headers.clone())
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse::new(status, headers, body))
    }
}
