//! Room configuration and the match state machine.

use std::time::Duration;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Seats per room. The whole design is head-to-head; this is not a knob.
pub const MAX_SEATS: usize = 2;

/// Per-room settings, shared by every room a registry spawns.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Health each player starts the match with.
    pub initial_health: u32,

    /// Breather between a correct submission and the next problem.
    pub respite: Duration,

    /// Language label shown in opponent info panels.
    pub language: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            initial_health: 5,
            respite: Duration::from_millis(1500),
            language: "risc-v".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// Transitions only move forward:
///
/// ```text
/// Waiting → Ready → Active → Closed
/// ```
///
/// - **Waiting**: 0–1 seats filled, accepting joins.
/// - **Ready**: both seats filled, match not yet dealt. Transient — the
///   room advances to Active in the same attach.
/// - **Active**: a problem is being served, submissions are judged.
/// - **Closed**: terminal. Seats detached, disposal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    Waiting,
    Ready,
    Active,
    Closed,
}

impl MatchState {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if the match is running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` once the room is gone for good.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// The next state in the strict forward order, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Ready),
            Self::Ready => Some(Self::Active),
            Self::Active => Some(Self::Closed),
            Self::Closed => None,
        }
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Ready => write!(f, "Ready"),
            Self::Active => write!(f, "Active"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_state_next_follows_strict_order() {
        assert_eq!(MatchState::Waiting.next(), Some(MatchState::Ready));
        assert_eq!(MatchState::Ready.next(), Some(MatchState::Active));
        assert_eq!(MatchState::Active.next(), Some(MatchState::Closed));
        assert_eq!(MatchState::Closed.next(), None);
    }

    #[test]
    fn test_match_state_is_joinable_only_while_waiting() {
        assert!(MatchState::Waiting.is_joinable());
        assert!(!MatchState::Ready.is_joinable());
        assert!(!MatchState::Active.is_joinable());
        assert!(!MatchState::Closed.is_joinable());
    }

    #[test]
    fn test_match_state_is_active() {
        assert!(MatchState::Active.is_active());
        assert!(!MatchState::Waiting.is_active());
        assert!(!MatchState::Closed.is_active());
    }

    #[test]
    fn test_match_state_display() {
        assert_eq!(MatchState::Waiting.to_string(), "Waiting");
        assert_eq!(MatchState::Closed.to_string(), "Closed");
    }

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.initial_health, 5);
        assert_eq!(config.respite, Duration::from_millis(1500));
        assert_eq!(config.language, "risc-v");
    }
}
