//! The outbound delivery loop: one task per connection, draining the
//! session's mailbox onto the socket.

use std::sync::Arc;

use codeduel_transport::WsSender;

use crate::{Outbound, OutboxReceiver, Session};

/// Runs until the mailbox yields [`Outbound::Shutdown`], every deposit
/// handle is dropped, or a write fails.
///
/// On every exit path the socket's close handshake is initiated, so the
/// dispatch loop blocked on `recv` observes termination promptly instead
/// of idling against a half-dead connection. The session is marked dead
/// on the way out for the same reason.
pub async fn run_delivery(
    session: Arc<Session>,
    mut mailbox: OutboxReceiver,
    mut sender: WsSender,
) {
    while let Some(item) = mailbox.recv().await {
        match item {
            Outbound::Deliver(msg) => {
                let text = match codeduel_protocol::encode(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(
                            player_id = %session.player_id(),
                            error = %e,
                            "dropping unencodable outbound message"
                        );
                        continue;
                    }
                };
                if let Err(e) = sender.send_text(&text).await {
                    tracing::debug!(
                        player_id = %session.player_id(),
                        error = %e,
                        "outbound write failed"
                    );
                    break;
                }
            }
            Outbound::Shutdown => break,
        }
    }

    let _ = sender.close().await;
    session.mark_dead();
    tracing::debug!(player_id = %session.player_id(), "delivery loop finished");
}
