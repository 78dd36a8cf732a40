//! Quran.com API v4 client.
//!
//! [`ApiClient`] builds request URLs, decodes JSON bodies into the typed
//! models in [`models`], and retries transient failures with linear
//! backoff. The network itself sits behind the [`Transport`] trait so the
//! loader can be driven by [`mock::MockTransport`] in tests.
pub mod http;
pub mod mock;
pub mod models;

use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;

/// A failed GET. Every variant is treated as transient and retried.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Errors surfaced by [`ApiClient`]. All of them abort a generation run.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to fetch {url} after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Blocking HTTP GET.
pub trait Transport {
    /// Fetch `url` and return the response body.
    fn get(&self, url: &Url) -> Result<String, TransportError>;
}

/// Retry behavior for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// After failed attempt `n` (1-based) the client waits `n * backoff_step`.
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_retries,
            backoff_step: config.retry_backoff(),
        }
    }

    /// No waiting between attempts.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_step: Duration::ZERO,
        }
    }

    fn backoff(&self, failed_attempt: u32) -> Duration {
        self.backoff_step * failed_attempt
    }
}

pub struct ApiClient<T: Transport> {
    transport: T,
    base_url: String,
    retry: RetryPolicy,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build `{base_url}/{endpoint}?k=v&...`.
    pub fn url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let url = if params.is_empty() {
            Url::parse(&raw)?
        } else {
            Url::parse_with_params(&raw, params.iter().map(|(k, v)| (*k, v.as_str())))?
        };
        Ok(url)
    }

    /// GET `endpoint` and decode the JSON body into `R`.
    pub fn get<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<R, ApiError> {
        let url = self.url(endpoint, params)?;
        let body = self.fetch_with_retry(&url)?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn fetch_with_retry(&self, url: &Url) -> Result<String, ApiError> {
        let max = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!("GET {url} (attempt {attempt}/{max})");
            match self.transport.get(url) {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!("Attempt {attempt}/{max} failed for {url}: {e}");
                    if attempt >= max {
                        return Err(ApiError::RetriesExhausted {
                            url: url.to_string(),
                            attempts: max,
                            source: e,
                        });
                    }
                    let wait = self.retry.backoff(attempt);
                    if !wait.is_zero() {
                        warn!("Retrying in {}s...", wait.as_secs_f32());
                        thread::sleep(wait);
                    }
                    attempt += 1;
                }
            }
        }
    }
}
