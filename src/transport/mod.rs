//! HTTP transport with retry and backoff.
//!
//! The cache layer only depends on [`RetryingTransport`]; [`HttpTransport`] is the
//! reqwest-backed implementation used against the IBGE services.

mod http;
mod retry;

pub use http::HttpTransport;
pub use retry::RetryOptions;

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;

/// Response returned by a [`RetryingTransport`] after its final attempt.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// GET transport that owns retry, backoff and timeouts.
#[async_trait]
pub trait RetryingTransport: Send + Sync {
    async fn fetch_with_retry(&self, url: &str, options: &RetryOptions)
        -> Result<TransportResponse>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
