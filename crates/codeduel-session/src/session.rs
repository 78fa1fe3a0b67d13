//! The server's record of one connected player.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use codeduel_protocol::{PlayerId, ServerMessage};
use rand::Rng;

use crate::Outbox;

/// Name shown for a player who never announced one.
const ANONYMOUS: &str = "anonymous";

/// One connected player.
///
/// Shared as `Arc<Session>` between the dispatch task, the room actor,
/// and the background sweeps, so every mutable field is interior and
/// thread-safe on its own:
///
/// - `name` — set by the player's own `name`/`join`/`create` messages.
/// - `health` — dealt by the room at match start, decremented by the
///   room when the opponent lands a correct submission. Never negative.
/// - `alive` — cleared when either of the connection's loops exits;
///   the sweeps use it to find abandoned rooms and lobby entries.
pub struct Session {
    player_id: PlayerId,
    name: RwLock<Option<String>>,
    health: AtomicU32,
    alive: AtomicBool,
    outbox: Outbox,
}

impl Session {
    pub fn new(player_id: PlayerId, initial_health: u32, outbox: Outbox) -> Self {
        Self {
            player_id,
            name: RwLock::new(None),
            health: AtomicU32::new(initial_health),
            alive: AtomicBool::new(true),
            outbox,
        }
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    /// The display name, or a placeholder if none was announced.
    pub fn name(&self) -> String {
        self.name
            .read()
            .expect("session name lock poisoned")
            .clone()
            .unwrap_or_else(|| ANONYMOUS.to_owned())
    }

    pub fn set_name(&self, name: &str) {
        let mut slot = self.name.write().expect("session name lock poisoned");
        *slot = Some(name.to_owned());
    }

    pub fn health(&self) -> u32 {
        self.health.load(Ordering::Acquire)
    }

    /// Deals the starting health. Room logic only, at match start.
    pub fn deal_health(&self, health: u32) {
        self.health.store(health, Ordering::Release);
    }

    /// Decrements health by exactly 1, saturating at 0. Returns the new
    /// value. Room logic only, in response to the opponent's correct
    /// submission.
    pub fn take_damage(&self) -> u32 {
        let prev = self
            .health
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |h| h.checked_sub(1));
        match prev {
            Ok(p) => p - 1,
            Err(_) => 0, // already at zero
        }
    }

    /// `true` while both connection loops are running.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire) && !self.outbox.is_closed()
    }

    /// Marks the connection dead. Either loop calls this on exit.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Deposits an outbound message into the mailbox. Non-blocking; a
    /// message for a dead connection is silently dropped.
    pub fn enqueue(&self, msg: ServerMessage) {
        if !self.outbox.deliver(msg) {
            self.mark_dead();
        }
    }

    /// Tells the delivery loop to drain and close the connection.
    pub fn close_mailbox(&self) {
        self.outbox.shutdown();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("player_id", &self.player_id)
            .field("name", &self.name())
            .field("health", &self.health())
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Generates a fresh opaque player id: a 32-character hex token
/// (128 bits), unguessable and unique for any realistic player count.
pub fn generate_player_id() -> PlayerId {
    let bytes: [u8; 16] = rand::rng().random();
    PlayerId(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Outbound, outbox};

    fn session() -> (Session, crate::OutboxReceiver) {
        let (tx, rx) = outbox();
        (Session::new(generate_player_id(), 5, tx), rx)
    }

    #[test]
    fn test_generate_player_id_is_32_hex_chars() {
        let id = generate_player_id();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_player_id_is_unique() {
        assert_ne!(generate_player_id(), generate_player_id());
    }

    #[test]
    fn test_name_defaults_to_anonymous() {
        let (s, _rx) = session();
        assert_eq!(s.name(), "anonymous");
    }

    #[test]
    fn test_set_name_overrides() {
        let (s, _rx) = session();
        s.set_name("ada");
        assert_eq!(s.name(), "ada");
    }

    #[test]
    fn test_take_damage_decrements_by_one() {
        let (s, _rx) = session();
        assert_eq!(s.take_damage(), 4);
        assert_eq!(s.health(), 4);
    }

    #[test]
    fn test_take_damage_saturates_at_zero() {
        let (s, _rx) = session();
        for _ in 0..5 {
            s.take_damage();
        }
        assert_eq!(s.health(), 0);
        assert_eq!(s.take_damage(), 0);
        assert_eq!(s.health(), 0);
    }

    #[test]
    fn test_health_is_monotonically_non_increasing() {
        let (s, _rx) = session();
        let mut last = s.health();
        for _ in 0..10 {
            s.take_damage();
            let now = s.health();
            assert!(now <= last);
            last = now;
        }
    }

    #[tokio::test]
    async fn test_enqueue_lands_in_mailbox() {
        let (s, mut rx) = session();
        s.enqueue(ServerMessage::Info { message: "hi".into() });
        assert!(matches!(
            rx.recv().await,
            Some(Outbound::Deliver(ServerMessage::Info { .. }))
        ));
    }

    #[test]
    fn test_enqueue_to_dropped_mailbox_marks_dead() {
        let (s, rx) = session();
        assert!(s.is_alive());
        drop(rx);
        s.enqueue(ServerMessage::Info { message: "lost".into() });
        assert!(!s.is_alive());
    }

    #[test]
    fn test_mark_dead_flips_liveness() {
        let (s, _rx) = session();
        assert!(s.is_alive());
        s.mark_dead();
        assert!(!s.is_alive());
    }
}
