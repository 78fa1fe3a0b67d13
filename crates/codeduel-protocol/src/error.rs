//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// Decoding deliberately has no error variant: classification of inbound
/// frames is total, and anything unrecognized maps to
/// [`Decoded::Unsupported`](crate::Decoded::Unsupported) instead.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of an outbound message failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),
}
