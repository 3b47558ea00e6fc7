//! Room configuration and the game-phase state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room the store creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Score that ends the game unless the host changes it.
    pub default_end_point: u32,

    /// Upper bound the host may set the end point to.
    pub max_end_point: u32,

    /// Length of generated room codes.
    pub code_length: usize,

    /// Bounded command queue per room actor.
    pub command_channel_size: usize,

    /// When a `getRoomData` caller matches no player by connection or
    /// name, hand them the host's seat instead of failing.
    pub host_fallback_on_lookup: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            default_end_point: 100,
            max_end_point: 500,
            code_length: 6,
            command_channel_size: 64,
            host_fallback_on_lookup: false,
        }
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Phase of the game in a room.
///
/// ```text
/// Waiting → Passing → Playing → Passing → Playing → … → Finished
/// ```
///
/// - **Waiting**: lobby; players join and ready up.
/// - **Passing**: hands are dealt, everyone selects three cards.
/// - **Playing**: thirteen tricks are played out.
/// - **Finished**: someone reached the end point (or the table broke up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    #[default]
    Waiting,
    Passing,
    Playing,
    Finished,
}

impl GameState {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` while hands are in play.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Passing | Self::Playing)
    }

    /// Returns `true` if moving to `target` follows the phase cycle.
    ///
    /// Any active phase may also drop straight to `Finished` when the
    /// table breaks up.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::Passing)
                | (Self::Passing, Self::Playing)
                | (Self::Playing, Self::Passing)
                | (Self::Passing | Self::Playing, Self::Finished)
        )
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Passing => write!(f, "passing"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}
