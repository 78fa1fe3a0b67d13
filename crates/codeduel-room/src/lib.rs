//! Match rooms for codeduel.
//!
//! Each room runs as an isolated Tokio task (actor model) owning one
//! head-to-head match: two seats, a health ledger, and a rotating
//! problem. The [`Registry`] is the only shared index over rooms.
//!
//! # Key types
//!
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`Registry`] — create, look up, and kill rooms
//! - [`MatchState`] — the Waiting → Ready → Active → Closed lifecycle
//! - [`Snapshot`] / [`JudgeOutcome`] — the two halves of a submission,
//!   so judging happens outside the actor

mod config;
mod error;
mod registry;
mod room;

pub use config::{MAX_SEATS, MatchState, RoomConfig};
pub use error::RoomError;
pub use registry::Registry;
pub use room::{
    AttachOutcome, DisposeFn, JudgeOutcome, RoomHandle, RoomInfo, SeatInfo, Snapshot,
};
