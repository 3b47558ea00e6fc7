//! The room model: a table of up to four players and the state of the
//! game being played at it.
//!
//! A [`Room`] is owned by exactly one room actor. Everything outside the
//! actor only ever sees clones of it, which is also what gets serialized
//! into outbound events as the room snapshot.
//!
//! This file holds the membership side (joining, readiness, leaving,
//! host settings). The game side lives in `controller.rs`.

use std::time::{SystemTime, UNIX_EPOCH};

use hearts_engine::{Card, PassDirection, Seat, Suit, Trick};
use hearts_protocol::{ConnectionId, RoomCode, RoomId};
use serde::{Deserialize, Serialize};

use crate::{GameError, GameState, RoomConfig};

/// Seats at a Hearts table.
pub const TABLE_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One seat at the table.
///
/// `id` is the connection currently bound to the seat. It changes when a
/// player reconnects and is re-bound through `getRoomData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: ConnectionId,
    pub name: String,
    pub is_host: bool,
    pub is_ready: bool,
    pub hand: Vec<Card>,
    pub score: u32,
    pub tricks: Vec<Trick>,
    pub passed_cards: Vec<Card>,
}

impl Player {
    pub fn new(id: ConnectionId, name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_host,
            is_ready: false,
            hand: Vec::new(),
            score: 0,
            tricks: Vec::new(),
            passed_cards: Vec::new(),
        }
    }

    /// Whether this player's pass selection for the round is in.
    pub fn has_passed(&self) -> bool {
        !self.passed_cards.is_empty()
    }
}

impl Seat for Player {
    fn hand(&self) -> &[Card] {
        &self.hand
    }

    fn hand_mut(&mut self) -> &mut Vec<Card> {
        &mut self.hand
    }

    fn passed(&self) -> &[Card] {
        &self.passed_cards
    }

    fn passed_mut(&mut self) -> &mut Vec<Card> {
        &mut self.passed_cards
    }

    fn tricks(&self) -> &[Trick] {
        &self.tricks
    }

    fn score(&self) -> u32 {
        self.score
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A room and its game.
///
/// Seat order in `players` is turn order; `current_turn` indexes into it.
/// Between rounds the 52 cards are split across hands, pending pass
/// selections, the current trick, won tricks, and whatever `deck` still
/// holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub code: RoomCode,
    pub players: Vec<Player>,
    pub game_state: GameState,
    pub current_turn: usize,
    pub current_trick: Vec<Card>,
    pub led_suit: Option<Suit>,
    pub pass_direction: PassDirection,
    pub deck: Vec<Card>,
    pub round_number: u32,
    pub max_players: usize,
    pub first_trick_of_round: bool,
    pub end_point: u32,
    pub max_end_point: u32,
    /// Unix time in milliseconds.
    pub created_at: u64,
}

impl Room {
    /// Creates a room in the lobby with `host_name` seated as host.
    pub fn new(
        id: RoomId,
        code: RoomCode,
        host: ConnectionId,
        host_name: &str,
        config: &RoomConfig,
    ) -> Result<Self, GameError> {
        let name = validate_name(host_name)?;
        Ok(Self {
            id,
            code,
            players: vec![Player::new(host, name, true)],
            game_state: GameState::Waiting,
            current_turn: 0,
            current_trick: Vec::new(),
            led_suit: None,
            pass_direction: PassDirection::Left,
            deck: Vec::new(),
            round_number: 0,
            max_players: TABLE_SIZE,
            first_trick_of_round: true,
            end_point: config.default_end_point,
            max_end_point: config.max_end_point,
            created_at: unix_millis(),
        })
    }

    /// Seat index of the player bound to `conn`.
    pub fn seat_of(&self, conn: ConnectionId) -> Option<usize> {
        self.players.iter().position(|p| p.id == conn)
    }

    pub fn player(&self, conn: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == conn)
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    /// Seats `conn` as a new non-host player.
    ///
    /// Joining again with a connection that already holds a seat is a
    /// no-op that returns the existing player.
    pub fn add_player(&mut self, conn: ConnectionId, name: &str) -> Result<&Player, GameError> {
        if let Some(seat) = self.seat_of(conn) {
            return Ok(&self.players[seat]);
        }
        if self.is_full() {
            return Err(GameError::RoomFull);
        }
        if !self.game_state.is_joinable() {
            return Err(GameError::GameInProgress);
        }
        let name = validate_name(name)?;

        self.players.push(Player::new(conn, name, false));
        Ok(&self.players[self.players.len() - 1])
    }

    /// Sets a player's ready flag. Only meaningful in the lobby.
    pub fn set_ready(&mut self, conn: ConnectionId, ready: bool) -> Result<(), GameError> {
        self.expect_state(GameState::Waiting)?;
        let seat = self.seat_of(conn).ok_or(GameError::PlayerNotFound)?;
        self.players[seat].is_ready = ready;
        Ok(())
    }

    /// `true` once every seat is taken and every player is ready.
    pub fn all_ready(&self) -> bool {
        self.players.len() == self.max_players && self.players.iter().all(|p| p.is_ready)
    }

    /// Removes the player bound to `conn` and returns them.
    ///
    /// If the host left, the first remaining seat becomes host. A game in
    /// progress cannot continue short-handed and is marked finished.
    pub fn remove_player(&mut self, conn: ConnectionId) -> Option<Player> {
        let seat = self.seat_of(conn)?;
        let removed = self.players.remove(seat);

        if !self.players.is_empty() && self.host().is_none() {
            self.players[0].is_host = true;
        }

        if self.game_state.is_active() {
            self.enter(GameState::Finished);
            self.current_trick.clear();
            self.led_suit = None;
        } else if self.current_turn >= self.players.len() {
            self.current_turn = 0;
        }

        Some(removed)
    }

    /// Re-binds the seat held by `old` to connection `new`.
    pub fn reassign_connection(
        &mut self,
        old: ConnectionId,
        new: ConnectionId,
    ) -> Result<&Player, GameError> {
        let seat = self.seat_of(old).ok_or(GameError::PlayerNotFound)?;
        self.players[seat].id = new;
        Ok(&self.players[seat])
    }

    /// Finds the seat a `getRoomData` caller should be bound to: first by
    /// connection, then by display name, then (if allowed) the host's.
    pub fn resolve_seat(
        &self,
        conn: ConnectionId,
        name: Option<&str>,
        host_fallback: bool,
    ) -> Option<usize> {
        self.seat_of(conn)
            .or_else(|| {
                let name = name.map(str::trim).filter(|n| !n.is_empty())?;
                self.players.iter().position(|p| p.name == name)
            })
            .or_else(|| {
                host_fallback
                    .then(|| self.players.iter().position(|p| p.is_host))
                    .flatten()
            })
    }

    /// Host-only: changes the score that ends the game.
    pub fn update_end_point(&mut self, conn: ConnectionId, value: i64) -> Result<u32, GameError> {
        let player = self.player(conn).ok_or(GameError::PlayerNotFound)?;
        if !player.is_host {
            return Err(GameError::NotHost);
        }

        let max = self.max_end_point;
        let end_point = u32::try_from(value)
            .ok()
            .filter(|v| (1..=max).contains(v))
            .ok_or(GameError::EndPointOutOfRange { value, max })?;

        self.end_point = end_point;
        Ok(end_point)
    }

    pub(crate) fn expect_state(&self, expected: GameState) -> Result<(), GameError> {
        if self.game_state == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                expected,
                actual: self.game_state,
            })
        }
    }

    /// Moves the room to `next`, which must follow the phase cycle.
    pub(crate) fn enter(&mut self, next: GameState) {
        debug_assert!(
            self.game_state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.game_state
        );
        tracing::debug!(room_id = %self.id, from = %self.game_state, to = %next, "phase change");
        self.game_state = next;
    }
}

fn validate_name(name: &str) -> Result<&str, GameError> {
    let name = name.trim();
    if name.is_empty() {
        Err(GameError::NameRequired)
    } else {
        Ok(name)
    }
}

pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
