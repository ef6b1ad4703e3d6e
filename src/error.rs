use crate::transport::TransportError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Structured error context attached to configuration and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Parameter or configuration key that caused the error (e.g. "params.uf", "IBGE_RETRY_MAX")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g. expected format, actual value)
    pub details: Option<String>,
    /// Component that raised the error (e.g. "cached_fetch", "tool_context")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the request pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Error for a non-success upstream response.
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Error::Http {
            status,
            status_text: status_text.into(),
        }
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// The closed category this error is counted under in metrics.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http { .. } => ErrorKind::HttpStatus,
            Error::Transport(_) => ErrorKind::Network,
            Error::Serialization(_) => ErrorKind::Parse,
            Error::Validation { .. } => ErrorKind::Validation,
            // Setup failures happen outside any tool call.
            Error::Configuration { .. } => ErrorKind::Unknown,
        }
    }
}

/// Finite set of failure categories used as per-kind metric counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    HttpStatus,
    Network,
    Parse,
    Validation,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::HttpStatus => "http_status",
            ErrorKind::Network => "network",
            ErrorKind::Parse => "parse",
            ErrorKind::Validation => "validation",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an error value onto an [`ErrorKind`] for instrumentation.
pub trait Classify {
    fn error_kind(&self) -> ErrorKind;
}

impl Classify for Error {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }
}

impl Classify for anyhow::Error {
    fn error_kind(&self) -> ErrorKind {
        self.downcast_ref::<Error>()
            .map(Error::kind)
            .unwrap_or(ErrorKind::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = Error::http(503, "Service Unavailable");
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
        assert_eq!(err.kind(), ErrorKind::HttpStatus);
    }

    #[test]
    fn test_context_is_rendered() {
        let err = Error::validation_with_context(
            "invalid state code",
            ErrorContext::new()
                .with_field_path("params.uf")
                .with_source("tool_context"),
        );
        assert_eq!(
            err.to_string(),
            "Validation error: invalid state code (field: params.uf, source: tool_context)"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.context().is_some());
    }

    #[test]
    fn test_configuration_error_is_unknown_kind() {
        let err = Error::configuration_with_context(
            "invalid proxy url",
            ErrorContext::new()
                .with_field_path("IBGE_PROXY_URL")
                .with_source("http_transport"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: invalid proxy url (field: IBGE_PROXY_URL, source: http_transport)"
        );
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("IBGE_PROXY_URL")
        );
    }

    #[test]
    fn test_anyhow_classification() {
        let wrapped = anyhow::Error::new(Error::http(404, "Not Found"));
        assert_eq!(wrapped.error_kind(), ErrorKind::HttpStatus);

        let opaque = anyhow::anyhow!("something odd");
        assert_eq!(opaque.error_kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_parse_errors_are_parse_kind() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(ErrorKind::Parse.to_string(), "parse");
    }
}
