//! # orbit-realtime
//!
//! Resilient single-socket subscription to a named room on the ORBIT `/ws`
//! push-update endpoint.
//!
//! A [`ConnectionManager`] owns one socket at a time and runs a driver task
//! through the cycle `Disconnected → Connecting → Connected → Disconnected`,
//! retrying forever at a fixed delay until [`ConnectionManager::teardown`]
//! (or drop) moves it to the terminal `Closed` state.
//!
//! The transport sits behind the [`Connector`]/[`Socket`] seam so the driver
//! can run against tokio-tungstenite ([`WsConnector`]) or an in-process fake.

#![deny(unsafe_code)]

pub mod endpoint;
pub mod error;
pub mod manager;
pub mod status;
pub mod transport;
pub mod tungstenite;

#[cfg(test)]
mod test_support;

pub use endpoint::Endpoint;
pub use error::RealtimeError;
pub use manager::{ConnectionConfig, ConnectionManager, ConnectionManagerBuilder, UpdateCallback};
pub use status::{ConnectionState, ConnectionStatus};
pub use transport::{Connector, Socket, SocketEvent};
pub use tungstenite::{WsConnector, WsSocket};
