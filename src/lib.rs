//! # ibge-mcp
//!
//! IBGE 统计数据工具服务器的请求管线：TTL 缓存、带重试的抓取与调用指标。
//!
//! Request pipeline for a tool server exposing IBGE (Brazilian Institute of Geography
//! and Statistics) data. Every tool call passes through the same path: the call is
//! measured by the metrics wrapper, the upstream response is looked up in a TTL cache,
//! and on a miss it is fetched through a retrying HTTP transport and cached.
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Cache keys, TTL store, TTL presets and the cache-first fetcher |
//! | [`telemetry`] | Call metrics collector, markdown report and instrumentation wrapper |
//! | [`transport`] | Retrying HTTP transport and its options |
//! | [`tools`] | [`ToolContext`] bundling the pipeline for tool handlers |
//! | [`config`] | Environment-driven pipeline configuration |
//! | [`logging`] | Stderr-only diagnostic logging, disabled by default |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ibge_mcp::cache::TtlPreset;
//! use ibge_mcp::tools::UpstreamApi;
//! use ibge_mcp::{PipelineConfig, ToolContext};
//!
//! #[tokio::main]
//! async fn main() -> ibge_mcp::Result<()> {
//!     let config = PipelineConfig::from_env();
//!     ibge_mcp::logging::init_logging(&config.logging);
//!     let ctx = ToolContext::new(config)?;
//!
//!     let estados = ctx
//!         .fetch_json(
//!             "ibge_estados",
//!             UpstreamApi::Localidades,
//!             &UpstreamApi::Localidades.endpoint("estados"),
//!             &[("orderBy", "nome".into())],
//!             Some(TtlPreset::Static.duration()),
//!         )
//!         .await?;
//!     eprintln!("{} states", estados.as_array().map(Vec::len).unwrap_or(0));
//!     eprintln!("{}", ctx.metrics().report());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod logging;
pub mod telemetry;
pub mod tools;
pub mod transport;

pub use cache::{cache_key, CacheStore, CachedFetcher, ParamValue, TtlPreset};
pub use config::PipelineConfig;
pub use telemetry::{
    with_metrics, with_metrics_traced, MetricEntry, MetricsCollector, MetricsSnapshot,
};
pub use tools::{ToolContext, UpstreamApi};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Classify, Error, ErrorContext, ErrorKind};
