use super::{RetryOptions, RetryingTransport, TransportError, TransportResponse};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("ibge-mcp/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed [`RetryingTransport`].
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Transport without a proxy.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_proxy(timeout, None)
    }

    /// Transport routed through `proxy_url`. System proxy variables are never consulted.
    ///
    /// A proxy URL reqwest cannot use is a configuration error, not a silent fallback.
    pub fn with_proxy(timeout: Duration, proxy_url: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(
                env::var("IBGE_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(16),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        builder = match proxy_url {
            Some(url) => {
                let proxy = Proxy::all(url).map_err(|e| {
                    Error::configuration_with_context(
                        format!("invalid proxy url: {}", e),
                        ErrorContext::new()
                            .with_field_path("IBGE_PROXY_URL")
                            .with_details(url)
                            .with_source("http_transport"),
                    )
                })?;
                debug!(proxy = url, "using explicit proxy");
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                format!("failed to build http client: {}", e),
                ErrorContext::new().with_source("http_transport"),
            )
        })?;

        Ok(Self { client })
    }

    async fn attempt(&self, url: &str) -> std::result::Result<TransportResponse, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

#[async_trait]
impl RetryingTransport for HttpTransport {
    async fn fetch_with_retry(
        &self,
        url: &str,
        options: &RetryOptions,
    ) -> Result<TransportResponse> {
        let mut attempt = 0;
        loop {
            debug!(url, attempt, "GET");
            match self.attempt(url).await {
                Ok(resp) => {
                    if attempt < options.max_retries && options.should_retry_status(resp.status) {
                        let delay = options.delay_for_attempt(attempt);
                        warn!(
                            url,
                            status = resp.status,
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "retryable status, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(e) => {
                    if attempt >= options.max_retries {
                        return Err(Error::Transport(TransportError::Http(e)));
                    }
                    let delay = options.delay_for_attempt(attempt);
                    warn!(
                        url,
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "request failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
