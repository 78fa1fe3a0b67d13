//! Waiting-list bookkeeping for connections still in matchmaking.
//!
//! A connection sits here from accept until it attaches to a room (or
//! gives up). The garbage collector sweeps the list for sessions whose
//! connection died mid-wait, so an abandoned browser tab doesn't pin a
//! `Session` forever.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use codeduel_protocol::PlayerId;

use crate::Session;

/// The set of sessions waiting for a join/create decision.
///
/// Internally synchronized; the lock guards only map operations, never
/// anything that awaits.
#[derive(Default)]
pub struct Lobby {
    waiting: Mutex<HashMap<PlayerId, Arc<Session>>>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session to the waiting list.
    pub fn register(&self, session: Arc<Session>) {
        let mut waiting = self.waiting.lock().expect("lobby lock poisoned");
        waiting.insert(session.player_id().clone(), session);
    }

    /// Removes a session (it attached, timed out, or disconnected).
    pub fn remove(&self, player_id: &PlayerId) {
        let mut waiting = self.waiting.lock().expect("lobby lock poisoned");
        waiting.remove(player_id);
    }

    /// Drops every entry whose connection is dead; returns their ids.
    pub fn sweep_dead(&self) -> Vec<PlayerId> {
        let mut waiting = self.waiting.lock().expect("lobby lock poisoned");
        let dead: Vec<PlayerId> = waiting
            .iter()
            .filter(|(_, s)| !s.is_alive())
            .map(|(id, _)| id.clone())
            .collect();
        for id in &dead {
            waiting.remove(id);
            tracing::debug!(player_id = %id, "swept dead lobby entry");
        }
        dead
    }

    pub fn len(&self) -> usize {
        self.waiting.lock().expect("lobby lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate_player_id, outbox};

    fn live_session() -> (Arc<Session>, crate::OutboxReceiver) {
        let (tx, rx) = outbox();
        (Arc::new(Session::new(generate_player_id(), 5, tx)), rx)
    }

    #[test]
    fn test_register_and_remove() {
        let lobby = Lobby::new();
        let (s, _rx) = live_session();
        let id = s.player_id().clone();

        lobby.register(s);
        assert_eq!(lobby.len(), 1);

        lobby.remove(&id);
        assert!(lobby.is_empty());
    }

    #[test]
    fn test_sweep_dead_removes_only_dead_sessions() {
        let lobby = Lobby::new();
        let (alive, _rx_a) = live_session();
        let (dead, _rx_b) = live_session();
        let dead_id = dead.player_id().clone();

        lobby.register(alive);
        lobby.register(dead.clone());
        dead.mark_dead();

        let swept = lobby.sweep_dead();

        assert_eq!(swept, vec![dead_id]);
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_sweep_dead_on_empty_lobby_is_noop() {
        let lobby = Lobby::new();
        assert!(lobby.sweep_dead().is_empty());
    }
}
