//! Player session layer for codeduel.
//!
//! A session is the live representation of one connected player:
//!
//! 1. **Identity & state** — opaque [`PlayerId`](codeduel_protocol::PlayerId),
//!    display name, health, liveness ([`Session`]).
//! 2. **Mailbox** — the ordered hand-off point room logic deposits
//!    outbound messages into ([`Outbox`]).
//! 3. **Delivery** — the task that drains the mailbox onto the socket
//!    ([`run_delivery`]).
//! 4. **Lobby** — bookkeeping for connections still waiting in
//!    matchmaking ([`Lobby`]).
//!
//! The inbound half (the dispatch loop) lives with the server, because
//! it needs the registry and the judge; this crate only owns what a
//! single connection needs.

mod delivery;
mod lobby;
mod outbox;
mod session;

pub use delivery::run_delivery;
pub use lobby::Lobby;
pub use outbox::{Outbound, Outbox, OutboxReceiver, outbox};
pub use session::{Session, generate_player_id};
