//! Connection lifecycle state.

use std::fmt;

/// Where the connection is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No socket; a reconnect may be pending.
    #[default]
    Disconnected,
    /// A socket is being opened.
    Connecting,
    /// The socket is open and frames flow.
    Connected,
    /// Torn down; no further connects will happen.
    Closed,
}

impl ConnectionState {
    /// Whether frames can be sent right now.
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Whether the state is terminal.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closed => "closed",
        })
    }
}

/// Snapshot of a connection, as rendered by a "Live"/"Offline" indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// Lifecycle state.
    pub state: ConnectionState,
    /// Most recent human-readable error; cleared on every successful open.
    pub last_error: Option<String>,
    /// Reconnect attempts since the last successful open.
    pub reconnect_attempts: u32,
}

impl ConnectionStatus {
    /// Shorthand for `state.is_connected()`.
    pub fn connected(&self) -> bool {
        self.state.is_connected()
    }

    /// `"Live"` while connected, `"Offline"` otherwise.
    pub fn indicator(&self) -> &'static str {
        if self.connected() { "Live" } else { "Offline" }
    }
}
