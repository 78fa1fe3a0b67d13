//! Core wire types for the codeduel protocol.
//!
//! Every message on the wire is a JSON envelope of the shape
//! `{"type": "<kind>", "data": {...}}`. The browser client switches on
//! `type`, so the exact kind strings and payload field names here are
//! load-bearing — they are the contract with the frontend.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Newtype over the random hex token generated at accept time. Opaque:
/// it carries no identity beyond "this connection". `#[serde(transparent)]`
/// keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a room (one head-to-head match).
///
/// Either caller-supplied (the `join` payload) or generated as a short
/// shareable code on `create`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Client → server messages
// ---------------------------------------------------------------------------

/// Everything a client may send.
///
/// `#[serde(tag = "type", content = "data")]` produces the adjacently
/// tagged envelope the client speaks:
///   `{ "type": "join", "data": { "name": "ada", "gameId": "a1b2c3" } }`
///
/// `join`/`create` are only meaningful before a match; `userCode` and
/// `submitUserCode` only during one. Phase enforcement is the dispatch
/// loop's job, not the codec's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join an existing room by id, announcing a display name.
    Join {
        name: String,
        #[serde(rename = "gameId")]
        game_id: RoomId,
    },

    /// Create a fresh room; the server echoes back the generated id.
    Create { name: String },

    /// Set (or update) the display name.
    Name { name: String },

    /// Live editor contents, echoed to the opponent as `opponentCode`.
    UserCode { code: String },

    /// Submit a program to the judge against the current problem.
    SubmitUserCode { code: String },
}

// ---------------------------------------------------------------------------
// Server → client messages
// ---------------------------------------------------------------------------

/// Outcome of a join attempt, reported in `join_status`.
///
/// Serialized as the upper-snake strings (`SUCCESS`, ...) the client
/// matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinOutcome {
    /// Second seat filled — the match is starting.
    Success,
    /// First seat filled — waiting for an opponent.
    NotEnoughPlayers,
    /// Both seats taken (or the match already started).
    GameFull,
}

/// Everything the server may send.
///
/// The kind strings are a historical mix of snake_case and camelCase;
/// they are renamed per variant rather than normalized because the
/// client already speaks this dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// Reply to `create`: the generated room id to share out-of-band.
    #[serde(rename = "created_game")]
    CreatedGame { id: RoomId },

    /// Reply to `join` (and to the first `create`r once seated).
    #[serde(rename = "join_status")]
    JoinStatus { status: JoinOutcome },

    /// Both seats filled; the match begins now.
    #[serde(rename = "starting")]
    Starting {},

    /// A new problem for both players.
    #[serde(rename = "problem")]
    Problem {
        description: String,
        #[serde(rename = "starterCode")]
        starter_code: String,
    },

    /// The opponent's live editor contents.
    #[serde(rename = "opponentCode")]
    OpponentCode { code: String },

    /// Verdict for a submission, with the judge's output for display.
    #[serde(rename = "result")]
    SubmissionResult { success: bool, message: String },

    /// Your health changed (the opponent solved the problem).
    #[serde(rename = "healthUpdate")]
    HealthUpdate {
        #[serde(rename = "newHealth")]
        new_health: u32,
    },

    /// Opponent display info: pushed at match start and after each
    /// judged submission.
    #[serde(rename = "oppInfo")]
    OpponentInfo {
        name: String,
        language: String,
        health: u32,
        console: String,
    },

    /// The match is over; `winner` is the surviving player's name.
    #[serde(rename = "gameOver")]
    GameOver { winner: String },

    /// Informational reply for malformed or out-of-phase input.
    #[serde(rename = "info")]
    Info { message: String },
}

// =========================================================================
// Tests
// =========================================================================
