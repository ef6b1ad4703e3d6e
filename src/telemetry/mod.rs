//! 调用指标模块：统计每个工具与上游接口的调用次数、耗时、缓存命中与失败。
//!
//! # Call Metrics Module
//!
//! Every tool invocation is wrapped by [`with_metrics`], which measures it and feeds
//! one [`MetricEntry`] into a [`MetricsCollector`].
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`MetricsCollector`] | Global, per-tool and per-API aggregates plus a bounded failure log |
//! | [`MetricEntry`] | Outcome record for a single call |
//! | [`MetricsSnapshot`] | Point-in-time copy of the aggregates, serializable |
//! | [`with_metrics`] | Instrumentation wrapper; never alters the wrapped result |
//!
//! ## Example
//!
//! ```rust
//! use ibge_mcp::telemetry::{MetricEntry, MetricsCollector};
//!
//! let metrics = MetricsCollector::new();
//! metrics.record(MetricEntry::new("ibge_estados", 12.0, true).with_api("localidades"));
//! assert_eq!(metrics.snapshot().total_calls, 1);
//! println!("{}", metrics.report());
//! ```
//!
//! Collection can be switched off at runtime with [`MetricsCollector::set_enabled`].

mod collector;
mod instrument;
mod report;

pub use collector::{
    ApiMetrics, ErrorRecord, MetricEntry, MetricsCollector, MetricsSnapshot, ToolMetrics,
    MAX_RECENT_ERRORS,
};
pub use instrument::{with_metrics, with_metrics_traced};
