use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

use super::upstream::UpstreamApi;
use crate::cache::{cache_key, CacheStore, CachedFetcher, ParamValue};
use crate::config::PipelineConfig;
use crate::telemetry::{with_metrics_traced, MetricsCollector};
use crate::transport::{HttpTransport, RetryingTransport};
use crate::{Error, ErrorContext, Result};

/// Shared state handed to every tool handler: one cache, one fetcher, one collector.
#[derive(Clone)]
pub struct ToolContext {
    config: PipelineConfig,
    cache: Arc<CacheStore>,
    fetcher: CachedFetcher,
    metrics: Arc<MetricsCollector>,
}

impl ToolContext {
    /// Context backed by the reqwest [`HttpTransport`], using the configured proxy if any.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let transport =
            HttpTransport::with_proxy(config.http_timeout, config.proxy_url.as_deref())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: PipelineConfig, transport: Arc<dyn RetryingTransport>) -> Self {
        let cache = Arc::new(CacheStore::with_default_ttl(config.default_ttl));
        let fetcher =
            CachedFetcher::new(cache.clone(), transport).with_retry_options(config.retry.clone());
        let metrics = Arc::new(MetricsCollector::new());
        metrics.set_enabled(config.metrics_enabled);
        info!(
            default_ttl_secs = config.default_ttl.as_secs(),
            max_retries = config.retry.max_retries,
            metrics = config.metrics_enabled,
            "tool context ready"
        );
        Self {
            config,
            cache,
            fetcher,
            metrics,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn fetcher(&self) -> &CachedFetcher {
        &self.fetcher
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Fetch `url` with `params` through the cache, recorded under `tool` and `api`.
    ///
    /// The call counts as a cache hit only if the fetcher actually served it from the
    /// cache. `ttl` of `None` uses the store default.
    pub async fn fetch_json(
        &self,
        tool: &str,
        api: UpstreamApi,
        url: &str,
        params: &[(&str, ParamValue)],
        ttl: Option<Duration>,
    ) -> Result<Value> {
        let key = cache_key(url, params);
        with_metrics_traced(&self.metrics, tool, Some(api.name()), async {
            let request_url = request_url(url, params)?;
            self.fetcher.fetch_traced(&request_url, &key, ttl, None).await
        })
        .await
    }

    /// Drop all cached data and accumulated metrics.
    pub fn reset(&self) {
        self.cache.clear();
        self.metrics.reset();
    }
}

/// `url` with the defined params appended as an encoded query string.
fn request_url(url: &str, params: &[(&str, ParamValue)]) -> Result<String> {
    let defined: Vec<(&str, String)> = params
        .iter()
        .filter(|(_, v)| v.is_defined())
        .map(|(k, v)| (*k, v.to_string()))
        .collect();
    if defined.is_empty() {
        return Ok(url.to_string());
    }
    let parsed = Url::parse_with_params(url, &defined).map_err(|e| {
        Error::validation_with_context(
            format!("invalid url: {}", e),
            ErrorContext::new()
                .with_field_path("url")
                .with_details(url)
                .with_source("tool_context"),
        )
    })?;
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_params() {
        let url = request_url(
            "https://servicodados.ibge.gov.br/api/v3/noticias",
            &[
                ("busca", "censo agro".into()),
                ("qtd", 5.into()),
                ("tipo", ParamValue::Undefined),
            ],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://servicodados.ibge.gov.br/api/v3/noticias?busca=censo+agro&qtd=5"
        );
    }

    #[test]
    fn test_request_url_without_params_is_unchanged() {
        let url = "https://servicodados.ibge.gov.br/api/v1/localidades/estados";
        assert_eq!(request_url(url, &[]).unwrap(), url);
    }

    #[test]
    fn test_request_url_rejects_garbage() {
        let err = request_url("not a url", &[("a", 1.into())]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }
}
