//! Realtime client errors.
//!
//! None of these reach consumers of a running [`ConnectionManager`]; the
//! driver converts them into `last_error` strings on the connection status.
//!
//! [`ConnectionManager`]: crate::ConnectionManager

use thiserror::Error;

/// Errors from endpoint construction and the socket transport.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// The configured base URL cannot produce a socket URL.
    #[error("invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Opening the socket failed.
    #[error("connect failed: {0}")]
    Connect(String),
    /// Writing to an open socket failed.
    #[error("transport error: {0}")]
    Transport(String),
}

impl RealtimeError {
    /// Short classification string for log fields.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint { .. } => "invalid_endpoint",
            Self::Connect(_) => "connect",
            Self::Transport(_) => "transport",
        }
    }
}
