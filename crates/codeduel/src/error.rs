//! Unified error type for the server crate.

use codeduel_room::RoomError;
use codeduel_transport::TransportError;

/// Top-level error for server startup and per-connection handling.
///
/// Everything here is scoped: a `ServerError` coming out of a connection
/// handler ends that one connection, never the process. The `#[from]`
/// impls let `?` lift sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level failure (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A room-level failure (the registry handed out a dying room).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeduel_protocol::RoomId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::SendFailed(std::io::Error::other("gone"));
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Transport(_)));
        assert!(server_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::Unavailable(RoomId("r1".into()));
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Room(_)));
    }
}
