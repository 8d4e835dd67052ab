//! Error types for the chatstream client.
//!
//! Three conditions unwind out of a call: a missing or invalid credential,
//! a transport failure (network error or non-success HTTP status), and a
//! caller-initiated cancellation. Malformed individual stream events are
//! not part of this taxonomy; the stream parser logs and skips them.

use std::fmt;

/// Result type alias for chatstream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for chatstream operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid client configuration. Produced before any
    /// network I/O and never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP request could not be completed, or the server answered
    /// with a non-success status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The caller aborted the in-flight request. Distinct from transport
    /// failure so callers can avoid reporting a false error state.
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is a caller-initiated cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Error type for failed exchanges with the chat-completions endpoint.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct TransportError {
    /// The error kind.
    pub kind: TransportErrorKind,
    /// HTTP status code, when the server produced a response.
    pub status: Option<u16>,
    /// Human-readable error message.
    pub message: String,
}

/// Categories of transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportErrorKind {
    /// Network or connection error.
    Network,
    /// Request timed out.
    Timeout,
    /// Non-success HTTP status.
    HttpStatus,
    /// Error while reading the response body stream.
    Stream,
}

impl TransportError {
    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Network,
            status: None,
            message: message.into(),
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Timeout,
            status: None,
            message: message.into(),
        }
    }

    /// Create an error for a non-success HTTP status.
    #[must_use]
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::HttpStatus,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create an error for a failure while reading the response stream.
    #[must_use]
    pub fn stream(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Stream,
            status: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status {
            write!(f, "HTTP {status}: ")?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout("request timed out")
        } else if err.is_connect() {
            Self::network(format!("connection failed: {err}"))
        } else if let Some(status) = err.status() {
            Self::http_status(status.as_u16(), err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(TransportError::from(err))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn config_creates_error() {
        let err = Error::config("API key not set");
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("API key not set"));
    }

    #[test]
    fn cancelled_is_distinct() {
        let err = Error::Cancelled;
        assert!(err.is_cancelled());
        assert!(!Error::config("x").is_cancelled());
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn network_creates_error() {
        let err = TransportError::network("connection refused");
        assert_eq!(err.kind, TransportErrorKind::Network);
        assert!(err.status.is_none());
        assert!(err.message.contains("connection refused"));
    }

    #[test]
    fn http_status_creates_error() {
        let err = TransportError::http_status(401, "Invalid API key");
        assert_eq!(err.kind, TransportErrorKind::HttpStatus);
        assert_eq!(err.status, Some(401));
        let s = err.to_string();
        assert!(s.contains("HTTP 401"));
        assert!(s.contains("Invalid API key"));
    }

    #[test]
    fn stream_creates_error() {
        let err = TransportError::stream("body cut short");
        assert_eq!(err.kind, TransportErrorKind::Stream);
        assert!(err.to_string().contains("body cut short"));
    }

    #[test]
    fn display_without_status() {
        let err = TransportError::network("timeout");
        assert!(!err.to_string().contains("HTTP"));
    }

    #[test]
    fn transport_wraps_into_error() {
        fn inner() -> std::result::Result<(), TransportError> {
            Err(TransportError::network("test"))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        let result = outer();
        assert!(matches!(result.unwrap_err(), Error::Transport(_)));
    }

    #[test]
    fn transport_error_preserves_status_through_error() {
        let err: Error = TransportError::http_status(503, "overloaded").into();
        if let Error::Transport(inner) = err {
            assert_eq!(inner.status, Some(503));
        } else {
            panic!("expected Error::Transport");
        }
    }

    #[test]
    fn implements_std_error() {
        let err = TransportError::network("test");
        let _: &dyn std::error::Error = &err;
    }
}
