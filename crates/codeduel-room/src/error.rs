//! Error types for the room layer.

use codeduel_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// Both seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The match already started; joins are no longer accepted.
    #[error("match already started in room {0}")]
    MatchStarted(RoomId),

    /// The room has closed.
    #[error("room {0} is closed")]
    Closed(RoomId),

    /// The player already holds a seat in this room.
    #[error("player {0} already in room {1}")]
    AlreadyAttached(PlayerId, RoomId),

    /// The room's actor is gone (command channel closed).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
