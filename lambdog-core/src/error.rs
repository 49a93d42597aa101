// Error types for lambdog invocations

use crate::PartialResponse;
use thiserror::Error;

/// Result type for lambdog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured errors raised while processing an invocation.
///
/// Every variant eventually becomes a [`Response`](crate::Response); none of
/// them escape [`Lambdog::call`](crate::Lambdog::call).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Route not found: {method} {path}")]
    RouteNotFound { method: String, path: String },

    #[error("Path prefix error: {0}")]
    PrefixStrip(String),

    #[error("{message}")]
    Handler {
        message: String,
        trace: Option<String>,
    },

    #[error("Middleware error: {0}")]
    Middleware(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a handler error carrying only a message.
    pub fn handler(message: impl Into<String>) -> Self {
        Error::Handler {
            message: message.into(),
            trace: None,
        }
    }

    /// Create a handler error with a diagnostic trace attached.
    pub fn with_trace(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Error::Handler {
            message: message.into(),
            trace: Some(trace.into()),
        }
    }

    /// The short, user-facing message.
    pub fn message(&self) -> String {
        match self {
            Error::Handler { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// The full diagnostic text, used when not running in production mode.
    pub fn trace(&self) -> String {
        match self {
            Error::Handler {
                message,
                trace: Some(trace),
            } => format!("{message}\n{trace}"),
            other => format!("{other}\n{other:?}"),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

/// A failed invocation stage.
///
/// Handlers either fail with a structured [`Error`], which goes through the
/// configured error callback, or with a response-shaped literal that overrides
/// the default error response field by field.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// Structured error; rendered by the error callback.
    Error(Error),
    /// Literal response override; passed through almost verbatim.
    Literal(PartialResponse),
}

impl Failure {
    /// Shorthand for a literal failure with a status and body.
    pub fn status(status_code: u16, body: impl Into<String>) -> Self {
        Failure::Literal(PartialResponse::new().status(status_code).body(body))
    }

    /// Whether this is a structured error.
    pub fn is_error(&self) -> bool {
        matches!(self, Failure::Error(_))
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Failure::Error(err)
    }
}

impl From<PartialResponse> for Failure {
    fn from(partial: PartialResponse) -> Self {
        Failure::Literal(partial)
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::Error(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_message_is_display() {
        let err = Error::handler("boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn test_trace_includes_attached_trace() {
        let err = Error::with_trace("boom", "at handler (orders.rs:12)");
        assert!(err.trace().starts_with("boom"));
        assert!(err.trace().contains("orders.rs:12"));
    }

    #[test]
    fn test_trace_falls_back_to_debug() {
        let err = Error::Decode("expected value".to_string());
        let trace = err.trace();
        assert!(trace.contains("Decode error: expected value"));
        assert!(trace.contains("Decode(\"expected value\")"));
    }

    #[test]
    fn test_failure_conversions() {
        let failure: Failure = Error::handler("x").into();
        assert!(failure.is_error());

        let failure: Failure = PartialResponse::new().status(418).into();
        assert!(!failure.is_error());

        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let failure: Failure = parse_err.into();
        assert!(matches!(failure, Failure::Error(Error::Decode(_))));
    }

    #[test]
    fn test_failure_status_shorthand() {
        match Failure::status(1000, "foo") {
            Failure::Literal(partial) => {
                assert_eq!(partial.status_code, Some(1000));
                assert_eq!(partial.body.as_deref(), Some("foo"));
            }
            Failure::Error(_) => panic!("expected literal"),
        }
    }
}
