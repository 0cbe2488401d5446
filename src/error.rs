//! Error types for the relay
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::cache::CacheError;
use crate::fetch::FetchError;
use crate::models::responses::ErrorResponse;

// == Service Error Enum ==
/// Unified error type for the relay's operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A cache operation failed, usually because its producer did
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// An upstream fetch failed outside of any cache operation
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The caller's request was rejected before touching the upstream
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ServiceError {
    /// HTTP status this error maps to.
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Fetch(e) => fetch_status(e),
            ServiceError::Cache(e) => e
                .source
                .downcast_ref::<FetchError>()
                .map(fetch_status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// Maps an upstream fetch failure to the status the relay reports.
///
/// Client errors pass through, rate limiting reads as the relay being
/// temporarily unavailable, and everything else reads as a bad gateway.
fn fetch_status(err: &FetchError) -> StatusCode {
    match err {
        FetchError::HttpStatus { status, .. } if status.is_client_error() => *status,
        FetchError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
        FetchError::RetriesExhausted { source, .. } => fetch_status(source),
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Joins an error with its source chain into one readable message.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(error_chain(&self)));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the relay.
pub type Result<T> = std::result::Result<T, ServiceError>;
