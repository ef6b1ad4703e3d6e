//! Diagnostic logging.
//!
//! Stdout carries the tool protocol, so diagnostics only ever go to stderr and are
//! off unless explicitly enabled.

use std::env;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub enabled: bool,
    pub level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: LogLevel::Info,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Reads `IBGE_LOG_ENABLED` and `IBGE_LOG_LEVEL`; invalid values keep the defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("IBGE_LOG_ENABLED") {
            cfg.enabled = parse_flag(&v).unwrap_or(cfg.enabled);
        }
        if let Some(level) = env::var("IBGE_LOG_LEVEL").ok().and_then(|v| v.parse().ok()) {
            cfg.level = level;
        }
        cfg
    }

    /// Whether a message at `level` would be emitted.
    pub fn allows(&self, level: LogLevel) -> bool {
        self.enabled && level >= self.level
    }

    pub fn filter(&self) -> LevelFilter {
        if self.enabled {
            self.level.as_filter()
        } else {
            LevelFilter::OFF
        }
    }
}

pub(crate) fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Install the stderr subscriber. Does nothing when logging is disabled or a
/// global subscriber is already set.
///
/// `RUST_LOG` directives can narrow output per target, but nothing below the
/// configured level is ever written.
pub fn init_logging(cfg: &LogConfig) {
    if !cfg.enabled {
        return;
    }
    let _ = build_subscriber(cfg, None, std::io::stderr).try_init();
}

/// Subscriber writing to `writer`, filtered by `directives` (or `RUST_LOG` when `None`)
/// and capped at `cfg.filter()`.
fn build_subscriber<W>(
    cfg: &LogConfig,
    directives: Option<&str>,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = EnvFilter::builder().with_default_directive(cfg.filter().into());
    let env_filter = match directives {
        Some(d) => builder.parse_lossy(d),
        None => builder.from_env_lossy(),
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(cfg.filter())
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .with_ansi(false),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_disabled_by_default() {
        let cfg = LogConfig::default();
        assert!(!cfg.enabled);
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            assert!(!cfg.allows(level));
        }
        assert_eq!(cfg.filter(), LevelFilter::OFF);
    }

    #[test]
    fn test_level_threshold() {
        let cfg = LogConfig::new().with_enabled(true).with_level(LogLevel::Warn);
        assert!(!cfg.allows(LogLevel::Debug));
        assert!(!cfg.allows(LogLevel::Info));
        assert!(cfg.allows(LogLevel::Warn));
        assert!(cfg.allows(LogLevel::Error));
        assert_eq!(cfg.filter(), LevelFilter::WARN);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(" warning ".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("verbose".parse::<LogLevel>().is_err());
        assert!(LogLevel::Debug < LogLevel::Info && LogLevel::Warn < LogLevel::Error);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn emit_all(cfg: &LogConfig, directives: &str) -> String {
        let out = Captured::default();
        let sink = out.clone();
        let subscriber = build_subscriber(cfg, Some(directives), move || sink.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("cache lookup detail");
            tracing::info!("tool context ready");
            tracing::warn!("retryable status");
            tracing::error!("upstream unreachable");
        });
        out.text()
    }

    #[test]
    fn test_directives_cannot_go_below_configured_level() {
        let cfg = LogConfig::new().with_enabled(true).with_level(LogLevel::Error);
        let out = emit_all(&cfg, "debug");
        assert!(out.contains("upstream unreachable"));
        assert!(!out.contains("cache lookup detail"));
        assert!(!out.contains("tool context ready"));
        assert!(!out.contains("retryable status"));
    }

    #[test]
    fn test_directives_can_narrow_output() {
        let cfg = LogConfig::new().with_enabled(true).with_level(LogLevel::Debug);
        let out = emit_all(&cfg, "warn");
        assert!(!out.contains("cache lookup detail"));
        assert!(!out.contains("tool context ready"));
        assert!(out.contains("retryable status"));
        assert!(out.contains("upstream unreachable"));

        let out = emit_all(&cfg, "");
        assert!(out.contains("cache lookup detail"));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
