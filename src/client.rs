//! HTTP client for the remote pi digit service.
//!
//! One GET per call against `/v1/pi?start=<offset>&numberOfDigits=<count>`,
//! decoding a JSON envelope with a single `content` field. The client holds
//! no per-stream state; a single instance (and its connection pool) may be
//! shared across many streams.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Service path for digit retrieval, relative to the configured base URL.
const DIGITS_PATH: &str = "v1/pi";

/// JSON envelope returned by the digit service.
#[derive(Debug, Deserialize)]
struct DigitsResponse {
    content: String,
}

/// Abstraction over batch digit fetching, enabling testability.
///
/// [`DigitStream`](crate::DigitStream) drives its state machine through this
/// trait so it can be exercised with a deterministic mock transport,
/// decoupled from real network timing.
#[async_trait::async_trait]
pub trait DigitSource: Send + Sync {
    /// Fetch the contiguous digit range `[offset, offset + count)`.
    ///
    /// Returns the raw digit string from the service, nominally `count`
    /// characters long. Callers must tolerate a shorter string; the service
    /// truncates near its own maximum digit offset.
    async fn fetch_digits(&self, offset: u64, count: usize) -> Result<String>;
}

/// Production [`DigitSource`] backed by the pi.delivery HTTP API.
#[derive(Clone, Debug)]
pub struct PiClient {
    http: reqwest::Client,
    base_url: String,
}

impl PiClient {
    /// Create a client with the given configuration.
    ///
    /// Builds a `reqwest::Client` with the configured request timeout; the
    /// underlying connection pool is reused across calls.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Override the request timeout, rebuilding the inner HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }
}

#[async_trait::async_trait]
impl DigitSource for PiClient {
    /// Fetch a digit batch from the remote service.
    ///
    /// Issues exactly one request; retry policy belongs to the caller (see
    /// [`fetch_with_retry`](crate::retry::fetch_with_retry)). A non-2xx
    /// status is logged with its body for diagnostics, but the body is still
    /// decoded: the service contract is judged by the payload, not the
    /// status line. Decode failures surface as [`Error::Decode`].
    async fn fetch_digits(&self, offset: u64, count: usize) -> Result<String> {
        let url = format!("{}/{}", self.base_url, DIGITS_PATH);
        tracing::debug!(url = %url, start = offset, number_of_digits = count, "fetching digit batch");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("start", offset.to_string()),
                ("numberOfDigits", count.to_string()),
            ])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, start = offset, error = %e, "digit request failed");
                Error::Network(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "digit service returned non-success status"
            );
        }

        let envelope: DigitsResponse = serde_json::from_str(&body)?;
        Ok(envelope.content)
    }
}
