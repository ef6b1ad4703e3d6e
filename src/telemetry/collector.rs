//! Call metrics aggregation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ErrorKind;

/// Maximum number of failures kept in [`MetricsSnapshot::recent_errors`].
pub const MAX_RECENT_ERRORS: usize = 50;

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEntry {
    pub timestamp: DateTime<Utc>,
    pub tool: String,
    pub api: Option<String>,
    pub duration_ms: f64,
    pub success: bool,
    pub cached: bool,
    pub error_kind: Option<ErrorKind>,
}

impl MetricEntry {
    pub fn new(tool: impl Into<String>, duration_ms: f64, success: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            tool: tool.into(),
            api: None,
            duration_ms,
            success,
            cached: false,
            error_kind: None,
        }
    }

    pub fn with_api(mut self, api: impl Into<String>) -> Self {
        self.api = Some(api.into());
        self
    }

    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    pub fn with_error(mut self, kind: ErrorKind) -> Self {
        self.error_kind = Some(kind);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolMetrics {
    pub calls: u64,
    pub successes: u64,
    pub failures: u64,
    pub total_duration_ms: f64,
    pub avg_duration_ms: f64,
    pub last_called: Option<DateTime<Utc>>,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub errors: BTreeMap<ErrorKind, u64>,
}

/// Per-upstream counters. `avg_duration_ms` is a running mean over all calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiMetrics {
    pub calls: u64,
    pub errors: u64,
    pub avg_duration_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub tool: String,
    pub error: ErrorKind,
}

/// Aggregated metrics since start (or the last reset).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub start_time: DateTime<Utc>,
    pub total_calls: u64,
    pub total_successes: u64,
    pub total_failures: u64,
    pub total_cache_hits: u64,
    pub total_cache_misses: u64,
    pub tools: HashMap<String, ToolMetrics>,
    pub apis: HashMap<String, ApiMetrics>,
    /// Oldest first, at most [`MAX_RECENT_ERRORS`] entries.
    pub recent_errors: VecDeque<ErrorRecord>,
}

impl MetricsSnapshot {
    fn new() -> Self {
        Self {
            start_time: Utc::now(),
            total_calls: 0,
            total_successes: 0,
            total_failures: 0,
            total_cache_hits: 0,
            total_cache_misses: 0,
            tools: HashMap::new(),
            apis: HashMap::new(),
            recent_errors: VecDeque::new(),
        }
    }

    fn apply(&mut self, entry: MetricEntry) {
        self.total_calls += 1;
        if entry.success {
            self.total_successes += 1;
        } else {
            self.total_failures += 1;
        }
        if entry.cached {
            self.total_cache_hits += 1;
        } else {
            self.total_cache_misses += 1;
        }

        let tool = self.tools.entry(entry.tool.clone()).or_default();
        tool.calls += 1;
        tool.total_duration_ms += entry.duration_ms;
        tool.avg_duration_ms = tool.total_duration_ms / tool.calls as f64;
        tool.last_called = Some(entry.timestamp);
        if entry.success {
            tool.successes += 1;
        } else {
            tool.failures += 1;
        }
        if entry.cached {
            tool.cache_hits += 1;
        } else {
            tool.cache_misses += 1;
        }
        let failed_kind = if entry.success { None } else { entry.error_kind };
        if let Some(kind) = failed_kind {
            *tool.errors.entry(kind).or_insert(0) += 1;
        }

        if let Some(api_name) = entry.api {
            let api = self.apis.entry(api_name).or_default();
            let calls_before = api.calls as f64;
            api.calls += 1;
            api.avg_duration_ms =
                (api.avg_duration_ms * calls_before + entry.duration_ms) / api.calls as f64;
            if !entry.success {
                api.errors += 1;
            }
        }

        if let Some(kind) = failed_kind {
            self.recent_errors.push_back(ErrorRecord {
                timestamp: entry.timestamp,
                tool: entry.tool,
                error: kind,
            });
            while self.recent_errors.len() > MAX_RECENT_ERRORS {
                self.recent_errors.pop_front();
            }
        }
    }
}

/// Thread-safe collector. Each operation holds the lock only for its own update.
pub struct MetricsCollector {
    state: Mutex<MetricsSnapshot>,
    enabled: AtomicBool,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MetricsSnapshot::new()),
            enabled: AtomicBool::new(true),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// While disabled, [`MetricsCollector::record`] leaves all aggregates untouched.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn record(&self, entry: MetricEntry) {
        if !self.is_enabled() {
            return;
        }
        self.lock().apply(entry);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.lock().clone()
    }

    /// Markdown summary of the current aggregates.
    pub fn report(&self) -> String {
        self.snapshot().to_markdown()
    }

    /// Discard everything and restart the uptime clock.
    pub fn reset(&self) {
        *self.lock() = MetricsSnapshot::new();
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
