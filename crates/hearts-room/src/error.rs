//! Error types for the room layer.
//!
//! [`GameError`] is the expected-outcome kind: a move or request that the
//! rules or the room's phase reject. Its message goes back to the acting
//! client verbatim. [`RoomError`] adds the lookup and plumbing failures of
//! the store and the room actors.

use hearts_engine::{CardId, IllegalPlay};
use hearts_protocol::{ConnectionId, RoomCode, RoomId};

use crate::GameState;

/// A rejected action. Nothing in the room changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Create/join without a usable display name.
    #[error("player name must not be empty")]
    NameRequired,

    /// All seats are taken.
    #[error("room is full")]
    RoomFull,

    /// The table already started; joining is closed.
    #[error("game already in progress")]
    GameInProgress,

    /// The game needs a full table to start.
    #[error("need {needed} players to start, have {have}")]
    NotEnoughPlayers { needed: usize, have: usize },

    /// The action belongs to another phase.
    #[error("game is not in {expected} state (currently {actual})")]
    WrongPhase {
        expected: GameState,
        actual: GameState,
    },

    /// The connection has no seat in this room.
    #[error("player not found in room")]
    PlayerNotFound,

    /// Somebody else is on turn.
    #[error("it is not your turn")]
    NotYourTurn,

    /// The card id isn't in the player's hand.
    #[error("card {0} not found in hand")]
    CardNotInHand(CardId),

    /// Passing takes exactly three cards.
    #[error("must select exactly 3 cards to pass, got {0}")]
    MustPassThree(usize),

    /// The same card id was listed twice.
    #[error("card {0} selected more than once")]
    DuplicateCard(CardId),

    /// The player's selection for this round is already in.
    #[error("cards already passed this round")]
    AlreadyPassed,

    /// The rules forbid this card right now.
    #[error("invalid card play: {0}")]
    IllegalPlay(#[from] IllegalPlay),

    /// Host-only setting.
    #[error("only the host can change this setting")]
    NotHost,

    /// End point outside `(0, max]`.
    #[error("end point must be between 1 and {max}, got {value}")]
    EndPointOutOfRange { value: i64, max: u32 },
}

/// Errors from the room store and room actors.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this id.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// No room with this code.
    #[error("room {0} not found")]
    CodeNotFound(RoomCode),

    /// The connection isn't seated anywhere.
    #[error("{0} is not in any room")]
    NotInRoom(ConnectionId),

    /// One connection, one room.
    #[error("{0} is already in room {1}")]
    AlreadyInRoom(ConnectionId, RoomId),

    /// No unused room code could be drawn (code space full or zero length).
    #[error("no free room code available")]
    NoFreeCode,

    /// The room's actor is gone (room deleted mid-request).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// The room rejected the action.
    #[error(transparent)]
    Game(#[from] GameError),
}
