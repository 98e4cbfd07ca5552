//! Connection manager: one socket, one room, retry forever.
//!
//! The manager spawns a driver task that owns the socket. Consumers talk to
//! it through `&self` methods:
//!
//! - status reads come from a `watch` channel the driver writes;
//! - outbound frames go through a bounded queue that exists only while a
//!   socket is open, so sends while disconnected are dropped immediately;
//! - teardown cancels a [`CancellationToken`] the driver checks before every
//!   connect and races against every wait.
//!
//! Delivery is at-most-once and in receipt order per socket. Nothing is
//! replayed across a reconnect gap; consumers that need authoritative state
//! re-fetch it after observing `Connected` again.

use std::sync::Arc;
use std::time::Duration;

use orbit_core::constants::{RECONNECT_DELAY, TENANT_ID_KEY};
use orbit_core::{
    ConnectionId, ControlFrame, InboundMessage, KeyValueStore, MemoryStore, Room, TenantId, Update,
};
use orbit_settings::RealtimeSettings;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::endpoint::Endpoint;
use crate::error::RealtimeError;
use crate::status::{ConnectionState, ConnectionStatus};
use crate::transport::{Connector, Socket, SocketEvent};
use crate::tungstenite::WsConnector;

/// Receives `update` and `personal` payloads, in order, on the driver task.
pub type UpdateCallback = Arc<dyn Fn(Update) + Send + Sync>;

/// `last_error` after a failed connect.
pub const CONNECT_ERROR: &str = "Failed to connect";
/// `last_error` after a transport error on an open socket.
pub const SOCKET_ERROR: &str = "Connection error";

const DEFAULT_SEND_QUEUE: usize = 64;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Connection parameters.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Where to connect.
    pub endpoint: Endpoint,
    /// Fixed wait between a close and the next connect.
    pub reconnect_delay: Duration,
    /// Outbound queue capacity while connected.
    pub send_queue: usize,
}

impl ConnectionConfig {
    /// Config with the default 3000 ms reconnect delay.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            reconnect_delay: RECONNECT_DELAY,
            send_queue: DEFAULT_SEND_QUEUE,
        }
    }

    /// Build from loaded settings.
    pub fn from_settings(settings: &RealtimeSettings) -> Result<Self, RealtimeError> {
        Ok(Self {
            endpoint: Endpoint::new(&settings.base_url, &settings.ws_path)?,
            reconnect_delay: settings.reconnect_delay(),
            send_queue: settings.send_queue.max(1),
        })
    }

    /// Override the reconnect delay.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared state
// ─────────────────────────────────────────────────────────────────────────────

struct Shared {
    id: ConnectionId,
    room: RwLock<Room>,
    // Some exactly while a socket is open. Lock order: outbound, then room.
    outbound: Mutex<Option<mpsc::Sender<String>>>,
    status: watch::Sender<ConnectionStatus>,
}

impl Shared {
    /// Queue a frame on the open socket. Returns `false` if none is open or
    /// the queue is full.
    fn try_send(&self, text: String) -> bool {
        let slot = self.outbound.lock();
        let Some(tx) = slot.as_ref() else {
            return false;
        };
        match tx.try_send(text) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(msg)) => {
                warn!(
                    connection_id = %self.id,
                    msg_len = msg.len(),
                    "send queue full, dropping message"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    fn update_status(&self, modify: impl FnOnce(&mut ConnectionStatus)) {
        self.status.send_modify(modify);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ConnectionManager
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to a running connection. Dropping it tears the connection down.
pub struct ConnectionManager {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    /// Start building a manager for `room`. An empty room connects without
    /// subscribing.
    pub fn builder(config: ConnectionConfig, room: impl Into<Room>) -> ConnectionManagerBuilder {
        ConnectionManagerBuilder {
            config,
            room: room.into(),
            connector: None,
            local_store: None,
            on_message: None,
        }
    }

    /// Instance identifier used in log fields.
    pub fn id(&self) -> &ConnectionId {
        &self.shared.id
    }

    /// Room subscribed on every (re)connect.
    pub fn room(&self) -> Room {
        self.shared.room.read().clone()
    }

    /// Current status snapshot.
    pub fn status(&self) -> ConnectionStatus {
        self.shared.status.borrow().clone()
    }

    /// Whether a socket is open.
    pub fn is_connected(&self) -> bool {
        self.shared.status.borrow().connected()
    }

    /// Most recent error, cleared on every successful open.
    pub fn last_error(&self) -> Option<String> {
        self.shared.status.borrow().last_error.clone()
    }

    /// Receiver that observes every status change.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.shared.status.subscribe()
    }

    /// Send `{"type":"subscribe","room":room}` if open; no-op otherwise.
    pub fn subscribe(&self, room: impl Into<Room>) {
        let room = room.into();
        if !self.shared.try_send(ControlFrame::Subscribe { room: room.clone() }.to_json()) {
            debug!(connection_id = %self.shared.id, %room, "not connected, subscribe ignored");
        }
    }

    /// Send `{"type":"unsubscribe","room":room}` if open; no-op otherwise.
    pub fn unsubscribe(&self, room: impl Into<Room>) {
        let room = room.into();
        if !self.shared.try_send(ControlFrame::Unsubscribe { room: room.clone() }.to_json()) {
            debug!(connection_id = %self.shared.id, %room, "not connected, unsubscribe ignored");
        }
    }

    /// Replace the instance room.
    ///
    /// The socket stays open: a subscribe frame for the new room is sent over
    /// it, and every later reconnect subscribes to the new room.
    pub fn set_room(&self, room: impl Into<Room>) {
        let room = room.into();
        let slot = self.shared.outbound.lock();
        *self.shared.room.write() = room.clone();
        if room.is_empty() {
            return;
        }
        if let Some(tx) = slot.as_ref() {
            if tx.try_send(ControlFrame::Subscribe { room: room.clone() }.to_json()).is_err() {
                warn!(connection_id = %self.shared.id, %room, "send queue full, room subscribe dropped");
            }
        }
    }

    /// Serialize and send `message` if open; otherwise log and drop it.
    pub fn send<T: Serialize + ?Sized>(&self, message: &T) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                warn!(connection_id = %self.shared.id, error = %e, "failed to serialize message");
                return;
            }
        };
        if !self.shared.try_send(text) {
            warn!(connection_id = %self.shared.id, "WebSocket not connected, dropping message");
        }
    }

    /// Cancel any pending reconnect and close the socket. Idempotent.
    pub fn teardown(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        let _ = self.shared.outbound.lock().take();
        debug!(connection_id = %self.shared.id, "connection teardown");
    }

    /// Tear down and wait for the driver task to finish.
    pub async fn shutdown(&self) {
        self.teardown();
        let handle = self.driver.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(connection_id = %self.shared.id, error = %e, "connection driver failed");
            }
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Builder returned by [`ConnectionManager::builder`].
pub struct ConnectionManagerBuilder {
    config: ConnectionConfig,
    room: Room,
    connector: Option<Arc<dyn Connector>>,
    local_store: Option<Arc<dyn KeyValueStore>>,
    on_message: Option<UpdateCallback>,
}

impl ConnectionManagerBuilder {
    /// Transport to use; defaults to [`WsConnector`].
    #[must_use]
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Durable store holding the tenant identifier; defaults to an empty
    /// in-memory store (empty tenant).
    #[must_use]
    pub fn local_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.local_store = Some(store);
        self
    }

    /// Callback for `update` and `personal` payloads.
    #[must_use]
    pub fn on_message(mut self, callback: impl Fn(Update) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Arc::new(callback));
        self
    }

    /// Spawn the driver on the current tokio runtime and start connecting.
    pub fn spawn(self) -> ConnectionManager {
        let id = ConnectionId::generate();
        let (status, _) = watch::channel(ConnectionStatus::default());
        let shared = Arc::new(Shared {
            id: id.clone(),
            room: RwLock::new(self.room),
            outbound: Mutex::new(None),
            status,
        });
        let cancel = CancellationToken::new();

        let driver = Driver {
            shared: Arc::clone(&shared),
            config: self.config,
            connector: self.connector.unwrap_or_else(|| Arc::new(WsConnector)),
            local_store: self
                .local_store
                .unwrap_or_else(|| Arc::new(MemoryStore::new())),
            on_message: self.on_message,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(
            driver
                .run()
                .instrument(info_span!("connection", connection_id = %id)),
        );

        ConnectionManager {
            shared,
            cancel,
            driver: Mutex::new(Some(handle)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Driver
// ─────────────────────────────────────────────────────────────────────────────

struct Driver {
    shared: Arc<Shared>,
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
    local_store: Arc<dyn KeyValueStore>,
    on_message: Option<UpdateCallback>,
    cancel: CancellationToken,
}

enum Step {
    Stop,
    Outbound(String),
    Event(SocketEvent),
}

impl Driver {
    async fn run(self) {
        while !self.cancel.is_cancelled() {
            self.connect_once().await;
            if self.cancel.is_cancelled() {
                break;
            }

            debug!(delay = ?self.config.reconnect_delay, "scheduling reconnect");
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
            self.shared
                .update_status(|s| s.reconnect_attempts = s.reconnect_attempts.saturating_add(1));
            info!(
                attempt = self.shared.status.borrow().reconnect_attempts,
                "attempting to reconnect"
            );
        }

        let _ = self.shared.outbound.lock().take();
        self.shared.update_status(|s| s.state = ConnectionState::Closed);
        debug!("connection driver stopped");
    }

    /// One connect → pump → disconnect cycle.
    async fn connect_once(&self) {
        self.shared
            .update_status(|s| s.state = ConnectionState::Connecting);

        let tenant = self
            .local_store
            .get(TENANT_ID_KEY)
            .map(TenantId::from)
            .unwrap_or_default();
        let url = self.config.endpoint.socket_url(&tenant);
        debug!(%url, "opening websocket");

        let opened = tokio::select! {
            () = self.cancel.cancelled() => return,
            result = self.connector.connect(&url) => result,
        };
        let mut socket = match opened {
            Ok(socket) => socket,
            Err(e) => {
                warn!(error = %e, kind = e.error_kind(), "websocket connection error");
                self.shared.update_status(|s| {
                    s.state = ConnectionState::Disconnected;
                    s.last_error = Some(CONNECT_ERROR.to_owned());
                });
                return;
            }
        };

        let mut outbound = self.open_outbound();
        info!(room = %self.shared.room.read(), "websocket connected");

        let stopped = self.pump(socket.as_mut(), &mut outbound).await;

        let _ = self.shared.outbound.lock().take();
        if stopped {
            socket.close().await;
        }
        self.shared
            .update_status(|s| s.state = ConnectionState::Disconnected);
        info!("websocket disconnected");
    }

    /// Publish the outbound queue, with the room subscribe frame queued first.
    fn open_outbound(&self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(self.config.send_queue.max(1));
        {
            let mut slot = self.shared.outbound.lock();
            let room = self.shared.room.read().clone();
            if !room.is_empty() {
                let _ = tx.try_send(ControlFrame::Subscribe { room }.to_json());
            }
            *slot = Some(tx);
        }
        self.shared.update_status(|s| {
            s.state = ConnectionState::Connected;
            s.last_error = None;
            s.reconnect_attempts = 0;
        });
        rx
    }

    /// Move frames until the socket closes (`false`) or teardown (`true`).
    async fn pump(&self, socket: &mut dyn Socket, outbound: &mut mpsc::Receiver<String>) -> bool {
        loop {
            let step = tokio::select! {
                biased;
                () = self.cancel.cancelled() => Step::Stop,
                frame = outbound.recv() => frame.map_or(Step::Stop, Step::Outbound),
                event = socket.next_event() => Step::Event(event),
            };

            match step {
                Step::Stop => return true,
                Step::Outbound(text) => {
                    if let Err(e) = socket.send_text(text).await {
                        warn!(error = %e, "websocket send failed");
                        self.shared
                            .update_status(|s| s.last_error = Some(SOCKET_ERROR.to_owned()));
                    }
                }
                Step::Event(SocketEvent::Message(text)) => self.handle_frame(&text),
                Step::Event(SocketEvent::Error(reason)) => {
                    warn!(%reason, "websocket error");
                    self.shared
                        .update_status(|s| s.last_error = Some(SOCKET_ERROR.to_owned()));
                }
                Step::Event(SocketEvent::Closed) => return false,
            }
        }
    }

    fn handle_frame(&self, text: &str) {
        match InboundMessage::parse(text) {
            Ok(InboundMessage::Connected { tenant_id }) => {
                info!(tenant_id = ?tenant_id, "connected to websocket server");
            }
            Ok(InboundMessage::Unknown) => debug!("ignoring frame with unknown type"),
            Ok(message) => {
                let kind = message.kind();
                if let (Some(callback), Some(update)) = (&self.on_message, message.into_update()) {
                    debug!(kind, event = ?update.event, "delivering update");
                    callback(update);
                }
            }
            Err(e) => warn!(error = %e, len = text.len(), "error parsing websocket message"),
        }
    }
}
