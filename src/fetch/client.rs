//! Fetch Client Module
//!
//! Retry loop over a pluggable transport. Transient failures back off
//! exponentially, rate limits wait out `Retry-After`, and client errors
//! fail straight away.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::fetch::{ApiRequest, FetchError, FetchOptions, HttpTransport, RawResponse, Transport};

// == Constants ==
/// Default number of attempts per fetch
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff
const BACKOFF_BASE_MS: u64 = 1000;

/// Per-attempt delay when rate limited without a Retry-After header
const RATE_LIMIT_BASE_MS: u64 = 2000;

/// User agent presented to the upstream
const USER_AGENT_VALUE: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

// == Fetcher ==
/// Retrying HTTP client for the upstream catalog.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    default_headers: HeaderMap,
}

impl Fetcher {
    /// Creates a fetcher over the production HTTP transport.
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()))
    }

    /// Creates a fetcher over any transport. Tests use this to script
    /// outcomes.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        Self {
            transport,
            default_headers,
        }
    }

    // == Fetch With Retry ==
    /// Fetches `url`, retrying transient failures.
    ///
    /// Attempts are numbered from 1. Client errors other than 429 fail
    /// immediately; network and server errors back off exponentially; a 429
    /// waits out `Retry-After` when the upstream provides it. Once the
    /// attempt budget is spent the last error comes back wrapped in
    /// [`FetchError::RetriesExhausted`].
    ///
    /// # Arguments
    /// * `url` - Fully-formed URL to fetch
    /// * `options` - Per-call headers merged over the defaults
    /// * `max_retries` - Attempt budget; values below 1 still get one attempt
    ///
    /// # Returns
    /// * `Ok(RawResponse)` - First successful response
    /// * `Err(FetchError)` - Immediate client error or exhausted retries
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        options: FetchOptions,
        max_retries: u32,
    ) -> Result<RawResponse, FetchError> {
        let mut headers = self.default_headers.clone();
        headers.extend(options.headers);

        let request = ApiRequest {
            url: url.to_string(),
            headers,
        };

        let attempts = max_retries.max(1);
        let mut last_error: Option<FetchError> = None;

        for attempt in 1..=attempts {
            match self.transport.execute(&request).await {
                Ok(response) if response.status == StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response.retry_after_secs();
                    warn!(url, attempt, ?retry_after, "rate limited by upstream");
                    if attempt < attempts {
                        tokio::time::sleep(rate_limit_delay(retry_after, attempt)).await;
                        continue;
                    }
                    last_error = Some(FetchError::RateLimited {
                        status: response.status,
                        retry_after,
                    });
                }
                Ok(response) if !response.is_success() => {
                    let status = response.status;
                    if status.is_client_error() {
                        debug!(url, %status, "client error, not retrying");
                        return Err(FetchError::HttpStatus { status });
                    }
                    warn!(url, %status, attempt, "server error from upstream");
                    last_error = Some(FetchError::HttpStatus { status });
                }
                Ok(response) => {
                    debug!(url, status = %response.status, attempt, "fetch succeeded");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "fetch attempt failed");
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }
        }

        Err(FetchError::RetriesExhausted {
            attempts,
            source: Box::new(
                last_error.expect("retry loop records an error before exhausting attempts"),
            ),
        })
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

// == Delay Helpers ==
/// Exponential backoff: 1s, 2s, 4s, ... for attempts 1, 2, 3, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1))))
}

/// Delay after a 429: honor `Retry-After` when present, otherwise scale
/// linearly with the attempt number.
fn rate_limit_delay(retry_after_secs: Option<u64>, attempt: u32) -> Duration {
    match retry_after_secs {
        Some(secs) => Duration::from_secs(secs),
        None => Duration::from_millis(RATE_LIMIT_BASE_MS.saturating_mul(u64::from(attempt))),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::header::RETRY_AFTER;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    // Plays back a fixed sequence of outcomes and records what was sent.
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<RawResponse, FetchError>>>,
        calls: AtomicU32,
        last_request: Mutex<Option<ApiRequest>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<RawResponse, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("script ran out of responses")
        }
    }

    fn ok_response() -> Result<RawResponse, FetchError> {
        Ok(RawResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            b"{}".to_vec(),
        ))
    }

    fn status_response(status: StatusCode) -> Result<RawResponse, FetchError> {
        Ok(RawResponse::new(status, HeaderMap::new(), Vec::new()))
    }

    fn rate_limited(retry_after: Option<&str>) -> Result<RawResponse, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(value) = retry_after {
            headers.insert(RETRY_AFTER, HeaderValue::from_str(value).unwrap());
        }
        Ok(RawResponse::new(
            StatusCode::TOO_MANY_REQUESTS,
            headers,
            Vec::new(),
        ))
    }

    fn network_error() -> Result<RawResponse, FetchError> {
        Err(FetchError::Network {
            source: Box::new(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_returns_without_delay() {
        let transport = ScriptedTransport::new(vec![ok_response()]);
        let fetcher = Fetcher::with_transport(transport.clone());
        let started = Instant::now();

        let response = fetcher
            .fetch_with_retry(
                "http://upstream/api/templates/search",
                FetchOptions::default(),
                3,
            )
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(transport.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_fails_without_retry() {
        let transport = ScriptedTransport::new(vec![status_response(StatusCode::NOT_FOUND)]);
        let fetcher = Fetcher::with_transport(transport.clone());
        let started = Instant::now();

        let err = fetcher
            .fetch_with_retry(
                "http://upstream/api/templates/workflows/9",
                FetchOptions::default(),
                5,
            )
            .await
            .unwrap_err();

        match err {
            FetchError::HttpStatus { status } => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("expected http status error, got {other}"),
        }
        assert_eq!(transport.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_honors_retry_after() {
        let transport = ScriptedTransport::new(vec![rate_limited(Some("5")), ok_response()]);
        let fetcher = Fetcher::with_transport(transport.clone());
        let started = Instant::now();

        let response = fetcher
            .fetch_with_retry(
                "http://upstream/api/templates/search",
                FetchOptions::default(),
                3,
            )
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(transport.calls(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_without_header_scales_with_attempt() {
        let transport = ScriptedTransport::new(vec![
            rate_limited(None),
            rate_limited(None),
            rate_limited(None),
            ok_response(),
        ]);
        let fetcher = Fetcher::with_transport(transport.clone());
        let started = Instant::now();

        let response = fetcher
            .fetch_with_retry(
                "http://upstream/api/templates/search",
                FetchOptions::default(),
                4,
            )
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(transport.calls(), 4);
        // 2s after attempt 1, 4s after attempt 2, 6s after attempt 3
        assert_eq!(started.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_back_off_exponentially() {
        let transport = ScriptedTransport::new(vec![
            network_error(),
            network_error(),
            network_error(),
            ok_response(),
        ]);
        let fetcher = Fetcher::with_transport(transport.clone());
        let started = Instant::now();

        let response = fetcher
            .fetch_with_retry(
                "http://upstream/api/categories",
                FetchOptions::default(),
                4,
            )
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(transport.calls(), 4);
        // 1s after attempt 1, 2s after attempt 2, 4s after attempt 3
        assert_eq!(started.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_exhaust_attempts() {
        let transport = ScriptedTransport::new(vec![
            status_response(StatusCode::INTERNAL_SERVER_ERROR),
            status_response(StatusCode::INTERNAL_SERVER_ERROR),
            status_response(StatusCode::INTERNAL_SERVER_ERROR),
        ]);
        let fetcher = Fetcher::with_transport(transport.clone());
        let started = Instant::now();

        let err = fetcher
            .fetch_with_retry(
                "http://upstream/api/categories",
                FetchOptions::default(),
                3,
            )
            .await
            .unwrap_err();

        match err {
            FetchError::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                match *source {
                    FetchError::HttpStatus { status } => {
                        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR)
                    }
                    other => panic!("expected http status source, got {other}"),
                }
            }
            other => panic!("expected exhaustion, got {other}"),
        }
        assert_eq!(transport.calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_attempt_rate_limit_skips_the_wait() {
        let transport = ScriptedTransport::new(vec![rate_limited(Some("7"))]);
        let fetcher = Fetcher::with_transport(transport.clone());
        let started = Instant::now();

        let err = fetcher
            .fetch_with_retry(
                "http://upstream/api/templates/search",
                FetchOptions::default(),
                1,
            )
            .await
            .unwrap_err();

        match err {
            FetchError::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 1);
                match *source {
                    FetchError::RateLimited { retry_after, .. } => {
                        assert_eq!(retry_after, Some(7))
                    }
                    other => panic!("expected rate limit source, got {other}"),
                }
            }
            other => panic!("expected exhaustion, got {other}"),
        }
        assert_eq!(transport.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_failures_record_the_last_error() {
        let transport = ScriptedTransport::new(vec![
            rate_limited(None),
            network_error(),
            rate_limited(None),
        ]);
        let fetcher = Fetcher::with_transport(transport.clone());
        let started = Instant::now();

        let err = fetcher
            .fetch_with_retry(
                "http://upstream/api/templates/search",
                FetchOptions::default(),
                3,
            )
            .await
            .unwrap_err();

        match err {
            FetchError::RetriesExhausted { source, .. } => {
                assert!(matches!(
                    *source,
                    FetchError::RateLimited {
                        retry_after: None,
                        ..
                    }
                ));
            }
            other => panic!("expected exhaustion, got {other}"),
        }
        assert_eq!(transport.calls(), 3);
        // 2s rate limit wait, then 2s backoff after the network error
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_call_headers_override_defaults() {
        let transport = ScriptedTransport::new(vec![ok_response()]);
        let fetcher = Fetcher::with_transport(transport.clone());

        let mut options = FetchOptions::default();
        options
            .headers
            .insert(ACCEPT, HeaderValue::from_static("text/plain"));
        options
            .headers
            .insert("x-trace", HeaderValue::from_static("abc"));

        fetcher
            .fetch_with_retry("http://upstream/api/categories", options, 1)
            .await
            .unwrap();

        let request = transport
            .last_request
            .lock()
            .unwrap()
            .clone()
            .expect("request captured");
        assert_eq!(request.url, "http://upstream/api/categories");
        assert_eq!(request.headers.get(ACCEPT).unwrap(), "text/plain");
        assert_eq!(request.headers.get("x-trace").unwrap(), "abc");
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(request.headers.get(USER_AGENT).unwrap(), USER_AGENT_VALUE);
    }

    #[tokio::test]
    async fn test_zero_retries_still_attempts_once() {
        let transport = ScriptedTransport::new(vec![ok_response()]);
        let fetcher = Fetcher::with_transport(transport.clone());

        let response = fetcher
            .fetch_with_retry("http://upstream/api/categories", FetchOptions::default(), 0)
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_backoff_delay_doubles_per_attempt() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(4));
        assert_eq!(backoff_delay(4), Duration::from_secs(8));
    }

    #[test]
    fn test_rate_limit_delay_prefers_retry_after() {
        assert_eq!(rate_limit_delay(Some(30), 1), Duration::from_secs(30));
        assert_eq!(rate_limit_delay(None, 1), Duration::from_secs(2));
        assert_eq!(rate_limit_delay(None, 3), Duration::from_secs(6));
    }
}
