//! Socket transport seam.

use async_trait::async_trait;

use crate::error::RealtimeError;

/// Something that happened on an open socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// A text frame arrived.
    Message(String),
    /// The transport reported an error. A `Closed` event normally follows.
    Error(String),
    /// The socket is gone.
    Closed,
}

/// An open socket, exclusively owned by one connection driver.
///
/// `next_event` must be cancel-safe: the driver races it against outbound
/// frames and teardown.
#[async_trait]
pub trait Socket: Send {
    /// Write one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), RealtimeError>;

    /// Wait for the next event. Returns [`SocketEvent::Closed`] forever once
    /// the socket has ended.
    async fn next_event(&mut self) -> SocketEvent;

    /// Close the socket. Safe to call on an already-closed socket.
    async fn close(&mut self);
}

/// Opens sockets.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a socket to `url`.
    async fn connect(&self, url: &str) -> Result<Box<dyn Socket>, RealtimeError>;
}
