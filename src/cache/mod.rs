//! 响应缓存模块：按 TTL 缓存上游响应，减少对 IBGE 接口的重复请求。
//!
//! # Response Caching Module
//!
//! In-memory, per-process caching of parsed upstream responses.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheStore`] | Key/value store with per-entry expiry |
//! | [`cache_key`] / [`CacheKeyBuilder`] | Order-independent keys from a base plus params |
//! | [`CachedFetcher`] | Cache-first fetch over a [`RetryingTransport`](crate::transport::RetryingTransport) |
//! | [`TtlPreset`] | Named TTL policies (static, medium, short, realtime) |
//!
//! ## Example
//!
//! ```rust
//! use ibge_mcp::cache::{cache_key, CacheStore, TtlPreset};
//! use serde_json::json;
//!
//! let cache = CacheStore::new();
//! let key = cache_key("https://servicodados.ibge.gov.br/api/v1/localidades/estados", &[]);
//! cache.set(key.clone(), json!([{"sigla": "RJ"}]), Some(TtlPreset::Static.duration()));
//! assert!(cache.has(&key));
//! ```
//!
//! Entries are not persisted and are not shared across processes.

mod fetch;
mod key;
mod store;
mod ttl;

pub use fetch::CachedFetcher;
pub use key::{cache_key, CacheKeyBuilder, ParamValue};
pub use store::{CacheStats, CacheStore};
pub use ttl::{try_ttl_from_minutes, ttl_from_minutes, TtlPreset};
