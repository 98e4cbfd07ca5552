//! In-process fake transport for driver tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc};

use crate::error::RealtimeError;
use crate::transport::{Connector, Socket, SocketEvent};

/// Hands the test a [`ServerEnd`] for every socket the driver opens.
pub(crate) struct FakeConnector {
    attempts: AtomicUsize,
    fail_next: AtomicUsize,
    hang: AtomicBool,
    urls: Mutex<Vec<String>>,
    links: mpsc::UnboundedSender<ServerEnd>,
}

impl FakeConnector {
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ServerEnd>) {
        let (links, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            attempts: AtomicUsize::new(0),
            fail_next: AtomicUsize::new(0),
            hang: AtomicBool::new(false),
            urls: Mutex::new(Vec::new()),
            links,
        });
        (connector, rx)
    }

    /// Total `connect` calls so far.
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Make the next `n` connects fail.
    pub(crate) fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Make every connect wait forever.
    pub(crate) fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Socket>, RealtimeError> {
        let _ = self.attempts.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().push(url.to_owned());

        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let failing = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RealtimeError::Connect("connection refused".into()));
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(Notify::new());
        let closed_flag = Arc::new(AtomicBool::new(false));

        let _ = self.links.send(ServerEnd {
            url: url.to_owned(),
            events: event_tx,
            sent: sent_rx,
            closed: closed.clone(),
            closed_flag: closed_flag.clone(),
        });

        Ok(Box::new(FakeSocket {
            events: event_rx,
            sent: sent_tx,
            closed,
            closed_flag,
        }))
    }
}

struct FakeSocket {
    events: mpsc::UnboundedReceiver<SocketEvent>,
    sent: mpsc::UnboundedSender<String>,
    closed: Arc<Notify>,
    closed_flag: Arc<AtomicBool>,
}

#[async_trait]
impl Socket for FakeSocket {
    async fn send_text(&mut self, text: String) -> Result<(), RealtimeError> {
        self.sent
            .send(text)
            .map_err(|_| RealtimeError::Transport("peer gone".into()))
    }

    async fn next_event(&mut self) -> SocketEvent {
        self.events.recv().await.unwrap_or(SocketEvent::Closed)
    }

    async fn close(&mut self) {
        self.closed_flag.store(true, Ordering::SeqCst);
        self.closed.notify_one();
    }
}

/// The test's side of one fake socket.
pub(crate) struct ServerEnd {
    pub(crate) url: String,
    events: mpsc::UnboundedSender<SocketEvent>,
    sent: mpsc::UnboundedReceiver<String>,
    closed: Arc<Notify>,
    closed_flag: Arc<AtomicBool>,
}

impl ServerEnd {
    pub(crate) fn push(&self, text: &str) {
        let _ = self.events.send(SocketEvent::Message(text.to_owned()));
    }

    pub(crate) fn error(&self, reason: &str) {
        let _ = self.events.send(SocketEvent::Error(reason.to_owned()));
    }

    pub(crate) fn close(&self) {
        let _ = self.events.send(SocketEvent::Closed);
    }

    /// Next frame the client wrote.
    pub(crate) async fn next_sent(&mut self) -> Option<String> {
        self.sent.recv().await
    }

    /// Frame the client wrote, if one is already queued.
    pub(crate) fn try_sent(&mut self) -> Option<String> {
        self.sent.try_recv().ok()
    }

    /// Wait until the client closes this socket.
    pub(crate) async fn wait_closed(&self) {
        self.closed.notified().await;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed_flag.load(Ordering::SeqCst)
    }
}
