//! The mailbox between room logic and a session's delivery loop.
//!
//! Room logic deposits messages here without ever touching the socket;
//! the delivery task drains them in order. The queue is unbounded and
//! lossless: a burst of room messages (a health update chased by a fresh
//! problem) arrives complete and in order. A latest-wins slot polled on
//! an interval would coalesce such bursts; the ordered channel trades
//! that coalescing for ordering and removes the polling latency.

use codeduel_protocol::ServerMessage;
use tokio::sync::mpsc;

/// One item in a session's mailbox.
#[derive(Debug)]
pub enum Outbound {
    /// Write this message to the peer.
    Deliver(ServerMessage),
    /// Stop delivering and close the connection.
    Shutdown,
}

/// The deposit side of a session's mailbox. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl Outbox {
    /// Deposits a message. Non-blocking, always returns; `false` means
    /// the delivery side is gone and the message was dropped.
    pub fn deliver(&self, msg: ServerMessage) -> bool {
        self.tx.send(Outbound::Deliver(msg)).is_ok()
    }

    /// Asks the delivery loop to stop and close the connection.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Outbound::Shutdown);
    }

    /// `true` once the delivery side has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The drain side of a session's mailbox. Owned by the delivery task.
#[derive(Debug)]
pub struct OutboxReceiver {
    rx: mpsc::UnboundedReceiver<Outbound>,
}

impl OutboxReceiver {
    /// Waits for the next mailbox item; `None` once every [`Outbox`]
    /// clone has been dropped.
    pub async fn recv(&mut self) -> Option<Outbound> {
        self.rx.recv().await
    }

    /// Takes a pending item without waiting, if one is queued.
    pub fn try_recv(&mut self) -> Option<Outbound> {
        self.rx.try_recv().ok()
    }
}

/// Creates a connected mailbox pair.
pub fn outbox() -> (Outbox, OutboxReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Outbox { tx }, OutboxReceiver { rx })
}

// =========================================================================
// Tests
// =========================================================================
