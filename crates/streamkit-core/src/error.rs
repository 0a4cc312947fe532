//! Stable error taxonomy shared across every layer of the pipeline.
//!
//! `CoreError` carries a stable `&'static str` code, a human-readable
//! message, an optional boxed cause, and a coarse [`ErrorCategory`] the
//! caller can use to decide whether a condition was recoverable locally.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Stable, machine-checkable error codes, grouped by category:
/// Initialization, Resolution, Connection, Transport, Protocol, Encoding,
/// Shutdown.
pub mod codes {
    pub const SOCKET_INITIALIZATION_ERROR: &str = "init.socket";
    pub const SOCKET_GETHOSTBYNAME_ERROR: &str = "resolution.gethostbyname";
    pub const SOCKET_CONNECTION_ERROR: &str = "connection.refused";
    pub const SOCKET_CONNECTION_TIMEOUT: &str = "connection.timeout";
    pub const TRANSPORT_READ_ERROR: &str = "transport.read";
    pub const TRANSPORT_WRITE_ERROR: &str = "transport.write";
    pub const HTTP_PARSER_ERROR: &str = "protocol.http_parse";
    pub const DATAPOINT_VALUE_BUFFER_OVERFLOW: &str = "encoding.value_overflow";
    pub const SOCKET_SHUTDOWN_ERROR: &str = "shutdown.socket_shutdown";
    pub const SOCKET_CLOSE_ERROR: &str = "shutdown.socket_close";
    pub const DISPATCHER_TIMEOUT: &str = "connection.dispatcher_timeout";
}

/// Coarse classification a caller (or a test) can use without matching on
/// the stable code string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller-visible configuration or usage mistake (oversized value, bad feed id).
    Encoding,
    /// Name resolution or connect-time failure.
    Connection,
    /// Fatal errno surfaced from a read or write after filtering EAGAIN/EWOULDBLOCK.
    Transport,
    /// Malformed or truncated HTTP response.
    Protocol,
    /// Best-effort cleanup failure during shutdown; the socket is gone either way.
    Shutdown,
}

/// The pipeline's single error type. Every fallible operation in
/// `streamkit-core` and `streamkit-transport-tcp` returns
/// `Result<T, CoreError>`, and every layer's `LayerState::Error` variant
/// carries one of these.
#[derive(Debug)]
pub struct CoreError {
    code: &'static str,
    message: Cow<'static, str>,
    category: ErrorCategory,
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl CoreError {
    pub fn new(
        code: &'static str,
        category: ErrorCategory,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            category,
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Wraps a raw `io::Error` from a failed read/write, filtering the
    /// recoverable `WouldBlock` case is the caller's job — this constructor
    /// is only reached once a read or write has been judged fatal.
    pub fn from_io(code: &'static str, category: ErrorCategory, err: std::io::Error) -> Self {
        let message = err.to_string();
        Self::new(code, category, message).with_cause(err)
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl StdError for CoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c.as_ref() as &(dyn StdError + 'static))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
