//! Instrumentation wrapper around a unit of work.

use std::future::Future;
use std::time::Instant;
use tracing::{debug, warn};

use super::collector::{MetricEntry, MetricsCollector};
use crate::error::{Classify, ErrorKind};

/// Records the entry for one call. If dropped unfinished while the thread is
/// panicking, the call is recorded as an `unknown` failure. A plain drop
/// (cancellation) records nothing.
struct CallRecorder<'a> {
    collector: &'a MetricsCollector,
    tool: &'a str,
    api: Option<&'a str>,
    start: Instant,
    finished: bool,
}

impl<'a> CallRecorder<'a> {
    fn start(collector: &'a MetricsCollector, tool: &'a str, api: Option<&'a str>) -> Self {
        Self {
            collector,
            tool,
            api,
            start: Instant::now(),
            finished: false,
        }
    }

    fn finish(&mut self, cached: bool, error: Option<ErrorKind>) {
        self.finished = true;
        let duration_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        let mut entry =
            MetricEntry::new(self.tool, duration_ms, error.is_none()).with_cached(cached);
        if let Some(api) = self.api {
            entry = entry.with_api(api);
        }
        if let Some(kind) = error {
            entry = entry.with_error(kind);
        }
        debug!(
            tool = self.tool,
            api = self.api,
            cached,
            success = entry.success,
            duration_ms,
            "tool call finished"
        );
        self.collector.record(entry);
    }
}

impl Drop for CallRecorder<'_> {
    fn drop(&mut self) {
        if !self.finished && std::thread::panicking() {
            warn!(tool = self.tool, "tool call panicked");
            self.finish(false, Some(ErrorKind::Unknown));
        }
    }
}

/// Run `work`, recording exactly one [`MetricEntry`] for it.
///
/// The result (value or error) is returned exactly as `work` produced it. A panic
/// inside `work` is recorded as an `unknown` failure before it propagates.
pub async fn with_metrics<T, E, F>(
    collector: &MetricsCollector,
    tool: &str,
    api: Option<&str>,
    cached: bool,
    work: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Classify,
{
    let mut recorder = CallRecorder::start(collector, tool, api);
    let outcome = work.await;
    recorder.finish(cached, outcome.as_ref().err().map(Classify::error_kind));
    outcome
}

/// [`with_metrics`] for work that reports whether it was served from cache.
///
/// `work` yields the value with its hit flag; the flag is recorded and stripped.
/// Failures are recorded as misses.
pub async fn with_metrics_traced<T, E, F>(
    collector: &MetricsCollector,
    tool: &str,
    api: Option<&str>,
    work: F,
) -> Result<T, E>
where
    F: Future<Output = Result<(T, bool), E>>,
    E: Classify,
{
    let mut recorder = CallRecorder::start(collector, tool, api);
    match work.await {
        Ok((value, cached)) => {
            recorder.finish(cached, None);
            Ok(value)
        }
        Err(e) => {
            recorder.finish(false, Some(e.error_kind()));
            Err(e)
        }
    }
}

impl MetricsCollector {
    /// Method form of [`with_metrics`].
    pub async fn instrument<T, E, F>(
        &self,
        tool: &str,
        api: Option<&str>,
        cached: bool,
        work: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Classify,
    {
        with_metrics(self, tool, api, cached, work).await
    }
}
