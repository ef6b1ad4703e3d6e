//! Tool-facing entry point.
//!
//! Handlers receive a [`ToolContext`] and call [`ToolContext::fetch_json`], which runs
//! the cached fetch inside the metrics wrapper.

mod context;
mod upstream;

pub use context::ToolContext;
pub use upstream::UpstreamApi;
