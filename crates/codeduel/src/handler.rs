//! Per-connection handling: the matchmaking supervisor and the in-match
//! dispatch loop.
//!
//! Each accepted connection gets its own task running [`handle_connection`].
//! The flow is:
//!   1. Spawn the delivery loop (the write half of the connection).
//!   2. Matchmaking: wait, bounded, for a valid `join`/`create`.
//!   3. Dispatch: route frames into the room until the connection or the
//!      match ends.
//!   4. Detach, close the mailbox, and join the delivery task.
//!
//! Phase rules live here: `join`/`create` are only valid pre-match,
//! `userCode`/`submitUserCode` only in-match. Out-of-phase or
//! unrecognized input always gets an `info` reply, never an error or a
//! hangup.

use std::sync::Arc;
use std::time::Duration;

use codeduel_judge::Judge;
use codeduel_protocol::{ClientMessage, Decoded, ServerMessage, decode};
use codeduel_room::{JudgeOutcome, RoomError, RoomHandle, Snapshot};
use codeduel_session::{Session, generate_player_id, outbox, run_delivery};
use codeduel_transport::{WsConnection, WsReceiver};

use crate::ServerError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<J: Judge>(
    conn: WsConnection,
    state: Arc<ServerState<J>>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    let (sender, mut receiver) = conn.split();

    let (mailbox, mailbox_rx) = outbox();
    let session = Arc::new(Session::new(
        generate_player_id(),
        state.config.initial_health,
        mailbox,
    ));
    tracing::info!(%conn_id, player_id = %session.player_id(), "player connected");

    let delivery = tokio::spawn(run_delivery(
        Arc::clone(&session),
        mailbox_rx,
        sender,
    ));

    let result = run_connection(&mut receiver, &session, &state).await;

    // Dispatch-side teardown must not depend on the departed session's
    // own tasks: mark dead, wake the delivery loop, drop lobby entry.
    session.mark_dead();
    session.close_mailbox();
    state.lobby.remove(session.player_id());
    let _ = delivery.await;

    tracing::info!(player_id = %session.player_id(), "player disconnected");
    result
}

async fn run_connection<J: Judge>(
    receiver: &mut WsReceiver,
    session: &Arc<Session>,
    state: &Arc<ServerState<J>>,
) -> Result<(), ServerError> {
    let Some(room) = matchmake(receiver, session, state).await? else {
        return Ok(());
    };

    let result = dispatch(receiver, session, &room, state).await;

    // Triggered by dispatch exit, whatever the reason — the room must
    // never wait on a dead connection to clean itself up.
    room.detach(session.player_id().clone()).await;
    result
}

// ---------------------------------------------------------------------------
// Matchmaking supervisor
// ---------------------------------------------------------------------------

/// Waits, bounded, for this connection to land a seat.
///
/// `Ok(None)` means no seat and nothing more to do: the peer closed, or
/// the matchmaking window expired (the connection is then closed with a
/// notice, and no room has been touched).
async fn matchmake<J: Judge>(
    receiver: &mut WsReceiver,
    session: &Arc<Session>,
    state: &Arc<ServerState<J>>,
) -> Result<Option<RoomHandle>, ServerError> {
    state.lobby.register(Arc::clone(session));
    let result = wait_for_seat(receiver, session, state).await;
    state.lobby.remove(session.player_id());
    result
}

async fn wait_for_seat<J: Judge>(
    receiver: &mut WsReceiver,
    session: &Arc<Session>,
    state: &Arc<ServerState<J>>,
) -> Result<Option<RoomHandle>, ServerError> {
    // The deadline bounds only the idle waits between frames — never an
    // in-flight attach, which must run to completion so a timeout can't
    // orphan a freshly taken seat.
    let deadline = tokio::time::Instant::now() + state.config.matchmaking_timeout;
    loop {
        let frame = match tokio::time::timeout_at(deadline, receiver.recv()).await {
            Ok(frame) => frame?,
            Err(_) => {
                tracing::info!(
                    player_id = %session.player_id(),
                    "matchmaking timed out"
                );
                session.enqueue(ServerMessage::Info {
                    message: "matchmaking timed out, closing the connection"
                        .to_owned(),
                });
                return Ok(None);
            }
        };
        let msg = match decode(&frame) {
            Decoded::Close => return Ok(None),
            Decoded::Unsupported => {
                session.enqueue(ServerMessage::Info {
                    message: "unsupported message type :(".to_owned(),
                });
                continue;
            }
            Decoded::Message(msg) => msg,
        };

        match msg {
            ClientMessage::Name { name } => session.set_name(&name),

            ClientMessage::Join { name, game_id } => {
                session.set_name(&name);
                let room = state.registry.get(&game_id);
                if attach_or_report(&room, session).await? {
                    return Ok(Some(room));
                }
            }

            ClientMessage::Create { name } => {
                session.set_name(&name);
                let room = state.registry.new_room();
                session.enqueue(ServerMessage::CreatedGame {
                    id: room.room_id().clone(),
                });
                if attach_or_report(&room, session).await? {
                    return Ok(Some(room));
                }
            }

            ClientMessage::UserCode { .. } | ClientMessage::SubmitUserCode { .. } => {
                session.enqueue(ServerMessage::Info {
                    message: "send a join or create message first".to_owned(),
                });
            }
        }
    }
}

/// Attempts an attach; `Ok(false)` means "no seat, keep waiting".
///
/// Capacity rejections are not errors: the room already told the caller
/// (`join_status: GAME_FULL`) and the connection stays open so they can
/// retry another id.
async fn attach_or_report(
    room: &RoomHandle,
    session: &Arc<Session>,
) -> Result<bool, ServerError> {
    match room.attach(Arc::clone(session)).await {
        Ok(_) => Ok(true),
        Err(RoomError::RoomFull(_) | RoomError::MatchStarted(_)) => Ok(false),
        Err(RoomError::Closed(id)) => {
            session.enqueue(ServerMessage::Info {
                message: format!("room {id} just closed, try another"),
            });
            Ok(false)
        }
        Err(RoomError::AlreadyAttached(..)) => {
            session.enqueue(ServerMessage::Info {
                message: "you already hold a seat in that room".to_owned(),
            });
            Ok(false)
        }
        Err(e @ RoomError::Unavailable(_)) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// In-match dispatch loop
// ---------------------------------------------------------------------------

/// How often the dispatch loop wakes from a blocked read to re-check
/// that the session is still worth reading for.
const LIVENESS_CHECK_INTERVAL: Duration = Duration::from_secs(5);

async fn dispatch<J: Judge>(
    receiver: &mut WsReceiver,
    session: &Arc<Session>,
    room: &RoomHandle,
    state: &Arc<ServerState<J>>,
) -> Result<(), ServerError> {
    loop {
        // Bounded read: a peer that never answers our close frame must
        // not pin this task forever after the room has gone away.
        let frame = match tokio::time::timeout(
            LIVENESS_CHECK_INTERVAL,
            receiver.recv(),
        )
        .await
        {
            Ok(frame) => frame?,
            Err(_) => {
                if session.is_alive() {
                    continue;
                }
                return Ok(());
            }
        };
        match decode(&frame) {
            Decoded::Close => return Ok(()),

            Decoded::Unsupported => {
                session.enqueue(ServerMessage::Info {
                    message: "unsupported message type :(".to_owned(),
                });
            }

            Decoded::Message(ClientMessage::Join { .. }) => {
                session.enqueue(ServerMessage::Info {
                    message: "You're in a game you can't send me a join message :("
                        .to_owned(),
                });
            }

            Decoded::Message(ClientMessage::Create { .. }) => {
                session.enqueue(ServerMessage::Info {
                    message: "You're in a game you can't send me a create message :("
                        .to_owned(),
                });
            }

            Decoded::Message(ClientMessage::Name { name }) => {
                session.set_name(&name);
            }

            Decoded::Message(ClientMessage::UserCode { code }) => {
                room.peer_code(session.player_id().clone(), code).await;
            }

            Decoded::Message(ClientMessage::SubmitUserCode { code }) => {
                submit(session, room, state, &code).await;
            }
        }

        // The room closing shuts the mailbox; wind the read side down
        // instead of idling against a connection that is going away.
        if !session.is_alive() {
            return Ok(());
        }
    }
}

/// One submission: snapshot the problem, judge outside the room, feed
/// the verdict back.
///
/// The judge await is the only long suspension in the dispatch loop; it
/// is bounded by the judge's own timeout, independent of matchmaking.
async fn submit<J: Judge>(
    session: &Arc<Session>,
    room: &RoomHandle,
    state: &Arc<ServerState<J>>,
    code: &str,
) {
    let snapshot = match room.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(_) => return, // room is gone; the loop will wind down
    };

    match snapshot {
        Snapshot::NotActive => {
            session.enqueue(ServerMessage::Info {
                message: "the match hasn't started yet".to_owned(),
            });
        }
        Snapshot::NoProblem => {
            session.enqueue(ServerMessage::SubmissionResult {
                success: false,
                message: "no problem is active".to_owned(),
            });
        }
        Snapshot::Current { epoch } => {
            tracing::debug!(
                player_id = %session.player_id(),
                "judging submission"
            );
            let outcome = match state.judge.execute(code).await {
                Ok(output) => JudgeOutcome::Output(output),
                Err(e) => JudgeOutcome::Error(e.to_string()),
            };
            room.apply_verdict(session.player_id().clone(), epoch, outcome)
                .await;
        }
    }
}
