//! Cache-first fetch over a retrying transport.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::store::CacheStore;
use crate::transport::{RetryOptions, RetryingTransport};
use crate::{Error, Result};

/// Checks the cache and falls through to the transport on a miss.
///
/// Failures are never cached; transport errors pass through unchanged.
#[derive(Clone)]
pub struct CachedFetcher {
    cache: Arc<CacheStore>,
    transport: Arc<dyn RetryingTransport>,
    retry: RetryOptions,
}

impl CachedFetcher {
    pub fn new(cache: Arc<CacheStore>, transport: Arc<dyn RetryingTransport>) -> Self {
        Self {
            cache,
            transport,
            retry: RetryOptions::default(),
        }
    }

    /// Retry options used when a call does not pass its own.
    pub fn with_retry_options(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub async fn fetch(
        &self,
        url: &str,
        cache_key: &str,
        ttl: Option<Duration>,
        retry: Option<&RetryOptions>,
    ) -> Result<Value> {
        let (data, _) = self.fetch_traced(url, cache_key, ttl, retry).await?;
        Ok(data)
    }

    /// [`CachedFetcher::fetch`], also telling whether the value came from the cache.
    pub async fn fetch_traced(
        &self,
        url: &str,
        cache_key: &str,
        ttl: Option<Duration>,
        retry: Option<&RetryOptions>,
    ) -> Result<(Value, bool)> {
        if let Some(hit) = self.cache.get(cache_key) {
            debug!(cache_key, "cache hit");
            return Ok((hit, true));
        }

        debug!(cache_key, url, "cache miss");
        let response = self
            .transport
            .fetch_with_retry(url, retry.unwrap_or(&self.retry))
            .await?;

        if !response.is_success() {
            return Err(Error::http(response.status, response.status_text));
        }

        let data: Value = response.json()?;
        self.cache.set(cache_key, data.clone(), ttl);
        Ok((data, false))
    }

    /// Same as [`CachedFetcher::fetch`], decoding the value into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        url: &str,
        cache_key: &str,
        ttl: Option<Duration>,
        retry: Option<&RetryOptions>,
    ) -> Result<T> {
        let value = self.fetch(url, cache_key, ttl, retry).await?;
        Ok(serde_json::from_value(value)?)
    }
}
