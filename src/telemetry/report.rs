//! Markdown rendering of a [`MetricsSnapshot`].

use chrono::{Local, Utc};
use std::fmt::Write;

use super::collector::MetricsSnapshot;

/// Number of failures listed in the report, newest first.
const REPORT_RECENT_ERRORS: usize = 10;

fn percent(part: u64, total: u64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{}%", (part as f64 / total as f64 * 100.0).round() as u64)
}

fn format_uptime(secs: i64) -> String {
    let secs = secs.max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

impl MetricsSnapshot {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let total = self.total_calls;
        let uptime = (Utc::now() - self.start_time).num_seconds();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "# IBGE MCP metrics\n");
        let _ = writeln!(out, "Uptime: {}\n", format_uptime(uptime));
        let _ = writeln!(out, "| Metric | Value | % |");
        let _ = writeln!(out, "|--------|-------|---|");
        let _ = writeln!(out, "| Total calls | {} | - |", total);
        let _ = writeln!(
            out,
            "| Successes | {} | {} |",
            self.total_successes,
            percent(self.total_successes, total)
        );
        let _ = writeln!(
            out,
            "| Failures | {} | {} |",
            self.total_failures,
            percent(self.total_failures, total)
        );
        let _ = writeln!(
            out,
            "| Cache hits | {} | {} |",
            self.total_cache_hits,
            percent(self.total_cache_hits, total)
        );
        let _ = writeln!(out, "| Cache misses | {} | - |", self.total_cache_misses);

        let _ = writeln!(out, "\n## Tools\n");
        if self.tools.is_empty() {
            let _ = writeln!(out, "_none_");
        } else {
            let mut tools: Vec<_> = self.tools.iter().collect();
            tools.sort_by(|(an, a), (bn, b)| b.calls.cmp(&a.calls).then_with(|| an.cmp(bn)));
            let _ = writeln!(
                out,
                "| Tool | Calls | Successes | Failures | Avg (ms) | Hit rate | Last call |"
            );
            let _ = writeln!(
                out,
                "|------|-------|-----------|----------|----------|----------|-----------|"
            );
            for (name, t) in tools {
                let last = t
                    .last_called
                    .map(|ts| ts.with_timezone(&Local).format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {:.0} | {} | {} |",
                    name,
                    t.calls,
                    t.successes,
                    t.failures,
                    t.avg_duration_ms,
                    percent(t.cache_hits, t.calls),
                    last
                );
            }
        }

        let _ = writeln!(out, "\n## Upstream APIs\n");
        if self.apis.is_empty() {
            let _ = writeln!(out, "_none_");
        } else {
            let mut apis: Vec<_> = self.apis.iter().collect();
            apis.sort_by(|(a, _), (b, _)| a.cmp(b));
            let _ = writeln!(out, "| API | Calls | Errors | Avg (ms) |");
            let _ = writeln!(out, "|-----|-------|--------|----------|");
            for (name, a) in apis {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {:.0} |",
                    name, a.calls, a.errors, a.avg_duration_ms
                );
            }
        }

        let _ = writeln!(out, "\n## Recent failures\n");
        if self.recent_errors.is_empty() {
            let _ = writeln!(out, "_none_");
        } else {
            for record in self.recent_errors.iter().rev().take(REPORT_RECENT_ERRORS) {
                let _ = writeln!(
                    out,
                    "- {} {}: {}",
                    record
                        .timestamp
                        .with_timezone(&Local)
                        .format("%d/%m/%Y %H:%M:%S"),
                    record.tool,
                    record.error
                );
            }
        }

        out
    }
}
