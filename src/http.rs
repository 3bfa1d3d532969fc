//! Single-request HTTP plumbing shared by the feed and article stages.
//!
//! One call to [`get_text`] is one attempt: validate the URL, send a GET,
//! require HTTP 200, and read the body under a size cap. The whole attempt
//! (send plus body read) is bounded by the configured timeout. Retrying is
//! the caller's business; see [`crate::retry`].

use crate::config::Config;
use crate::util::{validate_url, UrlValidationError};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// Why a single fetch attempt failed.
///
/// Transport, status, and quality failures are all retried the same way;
/// the remaining variants describe requests that cannot succeed on retry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, reset)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The attempt exceeded the configured request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Any response status other than 200
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    /// Extracted article text fell below the minimum length
    #[error("Content too short ({len} chars, minimum {min})")]
    ContentTooShort { len: usize, min: usize },
    /// Response body exceeded the configured size cap
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// The URL could not be used for a request at all
    #[error(transparent)]
    InvalidUrl(#[from] UrlValidationError),
}

impl FetchError {
    /// Returns true if another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_)
            | FetchError::Timeout(_)
            | FetchError::HttpStatus(_)
            | FetchError::ContentTooShort { .. } => true,
            FetchError::ResponseTooLarge(_) | FetchError::InvalidUrl(_) => false,
        }
    }
}

/// Per-attempt bounds applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub timeout: Duration,
    pub max_body_bytes: usize,
}

impl RequestLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.request_timeout_secs),
            max_body_bytes: config.max_response_bytes,
        }
    }
}

/// Build the shared client with browser-like request headers.
///
/// The timeout is not set here; [`get_text`] applies it per attempt so that
/// the body read is covered too.
pub fn build_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .build()
}

/// Perform one GET of `url` and return the body as text.
///
/// # Errors
///
/// - [`FetchError::InvalidUrl`] - `url` is not an absolute http(s) URL
/// - [`FetchError::Timeout`] - send plus body read exceeded `limits.timeout`
/// - [`FetchError::Network`] - connection or TLS failure
/// - [`FetchError::HttpStatus`] - status other than 200
/// - [`FetchError::ResponseTooLarge`] - body exceeded `limits.max_body_bytes`
pub async fn get_text(
    client: &reqwest::Client,
    url: &str,
    limits: RequestLimits,
) -> Result<String, FetchError> {
    let url = validate_url(url)?;

    let attempt = async {
        let response = client.get(url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        read_limited_text(response, limits.max_body_bytes).await
    };

    tokio::time::timeout(limits.timeout, attempt)
        .await
        .map_err(|_| FetchError::Timeout(limits.timeout))?
}

async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    // News sites still serve the odd latin-1 page; keep what decodes.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
