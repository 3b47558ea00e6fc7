//! Outbound events: what room actors push to connected clients.
//!
//! Every event that follows a state change carries the complete room
//! snapshot, so clients never have to patch local state.

use hearts_engine::Card;
use hearts_protocol::{ConnectionId, Recipient};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{Player, Room};

/// Channel feeding one connection's writer.
pub type MemberSender = mpsc::UnboundedSender<RoomEvent>;

/// Server → client events.
///
/// ```text
/// {"event":"cardPlayed","data":{"playerId":3,"card":{...},"room":{...}}}
/// {"event":"error","data":{"message":"it is not your turn"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum RoomEvent {
    RoomCreated { room: Room, player: Player },
    RoomJoined { room: Room, player: Player },
    RoomDataReceived { room: Room, player: Player },
    PlayerJoined { player: Player, room: Room },
    PlayerReady {
        player_id: ConnectionId,
        is_ready: bool,
        room: Room,
    },
    GameStarted { room: Room },
    CardsPassed { room: Room },
    CardsExchanged { room: Room },
    CardPlayed {
        player_id: ConnectionId,
        card: Card,
        room: Room,
    },
    TrickCompleted {
        winner_id: ConnectionId,
        points: u32,
        room: Room,
    },
    NewRound { room: Room },
    GameOver { winner: Player, room: Room },
    PlayerLeft { player_id: ConnectionId, room: Room },
    EndPointUpdated { end_point: u32, room: Room },
    /// Reply to a client heartbeat, sent only to that client.
    HeartbeatAck { client_time: u64, server_time: u64 },
    /// Sent only to the client whose request failed.
    Error { message: String },
}

impl RoomEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Answer to a heartbeat, stamped with the server's clock (unix ms).
    pub fn heartbeat_ack(client_time: u64) -> Self {
        Self::HeartbeatAck {
            client_time,
            server_time: crate::room::unix_millis(),
        }
    }
}

/// An event paired with who should receive it.
pub type Outbound = (Recipient, RoomEvent);
