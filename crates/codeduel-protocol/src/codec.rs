//! Frame classification and encoding.
//!
//! The inbound side is a *total* function: whatever arrives — malformed
//! JSON, an unknown `type`, a binary frame — classifies as
//! [`Decoded::Unsupported`] instead of erroring. The dispatch loop must
//! never be crashable by peer input; unrecognized traffic gets an `info`
//! reply and the connection lives on. Only a close frame gets special
//! treatment, regardless of its contents.
//!
//! The outbound side is the inverse and is well-formed by construction:
//! [`encode`] serializes a [`ServerMessage`] into the envelope the client
//! expects.

use codeduel_transport::InboundFrame;

use crate::{ClientMessage, ProtocolError, ServerMessage};

/// The result of classifying one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A well-formed message of a known kind.
    Message(ClientMessage),
    /// The peer is closing the connection.
    Close,
    /// Anything else: parse failure, unknown kind, non-text frame.
    Unsupported,
}

/// Classifies a raw inbound frame. Pure; never fails.
pub fn decode(frame: &InboundFrame) -> Decoded {
    match frame {
        InboundFrame::Text(text) => decode_text(text),
        InboundFrame::Binary => Decoded::Unsupported,
        InboundFrame::Closed => Decoded::Close,
    }
}

/// Classifies the text of an inbound frame.
pub fn decode_text(text: &str) -> Decoded {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => Decoded::Message(msg),
        Err(_) => Decoded::Unsupported,
    }
}

/// Serializes a server message into its wire envelope.
pub fn encode(msg: &ServerMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(ProtocolError::Encode)
}

/// Serializes a client message. The server itself never sends these;
/// test harnesses and client tooling do.
pub fn encode_client(msg: &ClientMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(ProtocolError::Encode)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoomId;

    // =====================================================================
    // Round trips — decode(encode(m)) reproduces m for every kind
    // =====================================================================

    fn round_trip(msg: ClientMessage) {
        let text = encode_client(&msg).unwrap();
        assert_eq!(decode_text(&text), Decoded::Message(msg));
    }

    #[test]
    fn test_decode_round_trips_every_client_kind() {
        round_trip(ClientMessage::Join {
            name: "ada".into(),
            game_id: RoomId("cafe01".into()),
        });
        round_trip(ClientMessage::Create { name: "grace".into() });
        round_trip(ClientMessage::Name { name: "linus".into() });
        round_trip(ClientMessage::UserCode { code: "addi x1, x0, 1".into() });
        round_trip(ClientMessage::SubmitUserCode { code: "ecall".into() });
    }

    #[test]
    fn test_encode_matches_client_dialect() {
        let text = encode(&ServerMessage::Info { message: "hi".into() }).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "info");
        assert_eq!(value["data"]["message"], "hi");
    }

    // =====================================================================
    // Classification policy — nothing crashes the dispatch loop
    // =====================================================================

    #[test]
    fn test_decode_text_garbage_is_unsupported() {
        assert_eq!(decode_text("not json at all"), Decoded::Unsupported);
    }

    #[test]
    fn test_decode_text_unknown_kind_is_unsupported() {
        assert_eq!(
            decode_text(r#"{"type": "flyToMoon", "data": {"speed": 9000}}"#),
            Decoded::Unsupported
        );
    }

    #[test]
    fn test_decode_text_wrong_payload_shape_is_unsupported() {
        // Known kind, but the payload is missing its required field.
        assert_eq!(
            decode_text(r#"{"type": "join", "data": {"name": "ada"}}"#),
            Decoded::Unsupported
        );
    }

    #[test]
    fn test_decode_text_empty_string_is_unsupported() {
        assert_eq!(decode_text(""), Decoded::Unsupported);
    }

    #[test]
    fn test_decode_binary_frame_is_unsupported() {
        assert_eq!(decode(&InboundFrame::Binary), Decoded::Unsupported);
    }

    #[test]
    fn test_decode_close_frame_is_close() {
        assert_eq!(decode(&InboundFrame::Closed), Decoded::Close);
    }

    #[test]
    fn test_decode_text_frame_dispatches_to_text_classifier() {
        let frame = InboundFrame::Text(
            r#"{"type": "create", "data": {"name": "ada"}}"#.into(),
        );
        assert_eq!(
            decode(&frame),
            Decoded::Message(ClientMessage::Create { name: "ada".into() })
        );
    }
}
