//! WebSocket listener and split connection halves, via `tokio-tungstenite`.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use crate::{ConnectionId, InboundFrame, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

/// Listens for incoming WebSocket connections.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds a listener to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }

    /// Returns the bound local address (useful when binding to port 0).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for and accepts the next incoming connection, performing
    /// the WebSocket upgrade handshake.
    pub async fn accept(&mut self) -> Result<WsConnection, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream).await.map_err(|e| {
            TransportError::AcceptFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                e,
            ))
        })?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %addr, "accepted WebSocket connection");

        Ok(WsConnection { id, ws })
    }
}

/// A single accepted WebSocket connection, before splitting.
pub struct WsConnection {
    id: ConnectionId,
    ws: WsStream,
}

impl WsConnection {
    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Splits into an owned write half and an owned read half, so the
    /// delivery and dispatch tasks never contend on a lock.
    pub fn split(self) -> (WsSender, WsReceiver) {
        let (sink, stream) = self.ws.split();
        (
            WsSender { id: self.id, sink },
            WsReceiver { id: self.id, stream },
        )
    }
}

/// The write half of a connection. Owned exclusively by the delivery task.
pub struct WsSender {
    id: ConnectionId,
    sink: SplitSink<WsStream, Message>,
}

impl WsSender {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Sends one text frame.
    pub async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| {
                TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    e,
                ))
            })
    }

    /// Initiates the close handshake. Errors are reported but the
    /// connection is unusable either way.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.sink.send(Message::Close(None)).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }
}

/// The read half of a connection. Owned exclusively by the dispatch task.
pub struct WsReceiver {
    id: ConnectionId,
    stream: SplitStream<WsStream>,
}

impl WsReceiver {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Receives the next frame from the peer.
    ///
    /// Ping/pong frames are consumed here (tungstenite answers pings on
    /// the next write). Returns [`InboundFrame::Closed`] on a close frame
    /// or a cleanly ended stream; transport faults are errors.
    pub async fn recv(&mut self) -> Result<InboundFrame, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(InboundFrame::Text(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(_))) => return Ok(InboundFrame::Binary),
                Some(Ok(Message::Close(_))) | None => return Ok(InboundFrame::Closed),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }
}
