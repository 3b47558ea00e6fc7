//! Identifiers and inbound events of the Hearts wire protocol.
//!
//! Frames are JSON objects of the shape `{"event": "<name>", "data": {...}}`
//! with camelCase names throughout, so the browser client can switch on
//! `event` and read `data` without any extra envelope.

use std::fmt;

use hearts_engine::CardId;
use hearts_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Server-internal identifier of a room.
///
/// Serialized as a plain number. Clients normally refer to rooms by
/// [`RoomCode`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// Short, human-shareable room code such as `"ABCD12"`.
///
/// Codes are case-insensitive on input: [`RoomCode::new`] trims and
/// upper-cases, and deserialization goes through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who an outbound event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every member of the room.
    All,

    /// One connection only (replies and errors).
    Connection(ConnectionId),
}

impl Recipient {
    /// Whether `conn` is covered by this recipient.
    pub fn includes(&self, conn: ConnectionId) -> bool {
        match self {
            Self::All => true,
            Self::Connection(target) => *target == conn,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientEvent: everything a client can ask for
// ---------------------------------------------------------------------------

/// Inbound events, one per client action.
///
/// ```text
/// {"event":"joinRoom","data":{"roomCode":"ABCD12","playerName":"Ana"}}
/// {"event":"passCards","data":{"cardIds":["…","…","…"]}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Open a new room with the sender as host.
    CreateRoom { player_name: String },

    /// Take a seat in an existing room.
    JoinRoom {
        room_code: RoomCode,
        player_name: String,
    },

    /// Fetch the current snapshot, re-binding the sender to their seat
    /// after a reconnect.
    GetRoomData {
        room_code: RoomCode,
        #[serde(default)]
        player_name: Option<String>,
    },

    /// Toggle readiness in the lobby.
    SetReady { is_ready: bool },

    /// Select three cards to pass.
    PassCards { card_ids: Vec<CardId> },

    /// Play one card into the current trick.
    PlayCard { card_id: CardId },

    /// Host-only: change the score that ends the game.
    ///
    /// Signed so that out-of-range input reaches validation and gets a
    /// readable error instead of a decode failure.
    UpdateEndPoint { end_point: i64 },

    /// Keep-alive. Answered with `heartbeatAck` echoing `clientTime`.
    Heartbeat {
        #[serde(default)]
        client_time: u64,
    },
}
