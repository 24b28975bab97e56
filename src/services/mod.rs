//! Outbound collaborators: weather, product catalog, translation and vision.
//!
//! Thin reqwest clients behind async traits. No retries: a failed call is
//! surfaced as `ServiceError` and the caller turns it into a fixed,
//! user-readable string.

pub mod catalog;
pub mod translate;
pub mod vision;
pub mod weather;

use std::time::Duration;

use reqwest::{Client, Response};

/// Errors from collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing API key: {0}")]
    MissingApiKey(String),
}

/// Shared HTTP client with a per-request timeout.
pub fn http_client(timeout: Duration) -> Result<Client, ServiceError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Turn a non-success status into `ServiceError::ApiError`.
pub(crate) async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_else(|_| "(no body)".into());
    Err(ServiceError::ApiError {
        status: status.as_u16(),
        message,
    })
}
