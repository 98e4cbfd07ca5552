//! tokio-tungstenite transport.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::error::RealtimeError;
use crate::transport::{Connector, Socket, SocketEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens real WebSocket connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Socket>, RealtimeError> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| RealtimeError::Connect(e.to_string()))?;
        debug!(status = %response.status(), "websocket handshake complete");
        Ok(Box::new(WsSocket::new(stream)))
    }
}

/// A tokio-tungstenite stream adapted to [`Socket`].
pub struct WsSocket {
    stream: WsStream,
    ended: bool,
}

impl WsSocket {
    /// Wrap an established stream.
    pub fn new(stream: WsStream) -> Self {
        Self {
            stream,
            ended: false,
        }
    }
}

#[async_trait]
impl Socket for WsSocket {
    async fn send_text(&mut self, text: String) -> Result<(), RealtimeError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| RealtimeError::Transport(e.to_string()))
    }

    async fn next_event(&mut self) -> SocketEvent {
        loop {
            if self.ended {
                return SocketEvent::Closed;
            }
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return SocketEvent::Message(text.as_str().to_owned()),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return SocketEvent::Message(text),
                    Err(_) => debug!(len = bytes.len(), "ignoring non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "close frame received");
                    self.ended = true;
                }
                // tungstenite answers pings itself
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(e)) => {
                    self.ended = true;
                    return SocketEvent::Error(e.to_string());
                }
                None => self.ended = true,
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "error closing websocket");
        }
        self.ended = true;
    }
}
