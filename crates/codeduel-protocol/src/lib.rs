//! Wire protocol for codeduel.
//!
//! This crate defines the language clients and server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`JoinOutcome`],
//!   the id newtypes) — the `{"type", "data"}` envelope structures.
//! - **Codec** ([`decode`], [`encode`]) — total classification of inbound
//!   frames and well-formed-by-construction encoding of outbound ones.
//! - **Errors** ([`ProtocolError`]) — what can go wrong when encoding.
//!
//! The protocol layer sits between transport (raw frames) and the
//! session/room layers (player context). It knows nothing about
//! connections, rooms, or the judge.

mod codec;
mod error;
mod types;

pub use codec::{Decoded, decode, decode_text, encode, encode_client};
pub use error::ProtocolError;
pub use types::{ClientMessage, JoinOutcome, PlayerId, RoomId, ServerMessage};
