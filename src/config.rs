//! Pipeline configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{try_ttl_from_minutes, TtlPreset};
use crate::logging::{parse_flag, LogConfig};
use crate::transport::RetryOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Per-attempt HTTP timeout.
    pub http_timeout: Duration,
    pub retry: RetryOptions,
    /// TTL used when a fetch does not name one.
    pub default_ttl: Duration,
    pub metrics_enabled: bool,
    pub logging: LogConfig,
    /// Explicit proxy for all upstream requests. System proxy variables are not consulted.
    pub proxy_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(30),
            retry: RetryOptions::default(),
            default_ttl: TtlPreset::Short.duration(),
            metrics_enabled: true,
            logging: LogConfig::default(),
            proxy_url: None,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `IBGE_*` environment variables.
    ///
    /// Unparsable or out-of-range values are ignored and the default is kept. The proxy URL
    /// is taken as-is and validated when the transport is built.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(secs) = env_parse::<u64>("IBGE_HTTP_TIMEOUT_SECS") {
            cfg.http_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = env_parse::<u32>("IBGE_RETRY_MAX") {
            cfg.retry.max_retries = n;
        }
        if let Some(ms) = env_parse::<u64>("IBGE_RETRY_INITIAL_DELAY_MS") {
            cfg.retry.initial_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("IBGE_RETRY_MAX_DELAY_MS") {
            cfg.retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(ttl) =
            env_parse::<f64>("IBGE_CACHE_DEFAULT_TTL_MINUTES").and_then(try_ttl_from_minutes)
        {
            cfg.default_ttl = ttl;
        }
        if let Some(enabled) = env::var("IBGE_METRICS_ENABLED").ok().and_then(|v| parse_flag(&v)) {
            cfg.metrics_enabled = enabled;
        }
        cfg.logging = LogConfig::from_env();
        cfg.proxy_url = env::var("IBGE_PROXY_URL")
            .ok()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        cfg
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_metrics_enabled(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn with_logging(mut self, logging: LogConfig) -> Self {
        self.logging = logging;
        self
    }

    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }
}
