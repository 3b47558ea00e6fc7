//! Room store: creates rooms, finds them by id or code, and tracks which
//! connection is seated where.

use std::collections::HashMap;

use hearts_protocol::{ConnectionId, RoomCode, RoomId};
use rand::Rng;

use crate::actor::spawn_room;
use crate::{Departure, MemberSender, Player, Rebound, Room, RoomConfig, RoomError, RoomHandle};

/// Characters room codes are drawn from.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws tried before giving up on finding a free code.
const CODE_ATTEMPTS: usize = 64;

/// Registry of all live rooms.
///
/// This is the entry point for room operations from the session router.
/// It is shared behind a `tokio::sync::Mutex`; per-room work is done by the
/// room actors, so callers that only need one room should clone its
/// [`RoomHandle`] out and release the lock before awaiting it.
pub struct RoomStore {
    config: RoomConfig,
    next_room_id: u64,

    /// Active rooms, keyed by room ID.
    rooms: HashMap<RoomId, RoomHandle>,

    codes: HashMap<RoomCode, RoomId>,

    /// Maps each connection to the room it is seated in.
    /// A connection is in at most ONE room at a time.
    members: HashMap<ConnectionId, RoomId>,
}

impl RoomStore {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            next_room_id: 1,
            rooms: HashMap::new(),
            codes: HashMap::new(),
            members: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a new room with `conn` as host and returns its first
    /// snapshot. The host receives `roomCreated` through `sender`.
    pub fn create_room(
        &mut self,
        conn: ConnectionId,
        name: &str,
        sender: MemberSender,
    ) -> Result<Room, RoomError> {
        self.ensure_free(conn, None)?;

        let room_id = RoomId(self.next_room_id);
        let code = self.generate_code()?;
        let room = Room::new(room_id, code.clone(), conn, name, &self.config)?;
        self.next_room_id += 1;

        let snapshot = room.clone();
        let handle = spawn_room(
            room,
            sender,
            self.config.host_fallback_on_lookup,
            self.config.command_channel_size,
        );

        self.rooms.insert(room_id, handle);
        self.codes.insert(code.clone(), room_id);
        self.members.insert(conn, room_id);
        tracing::info!(%room_id, %code, host = %conn, "room created");
        Ok(snapshot)
    }

    /// Seats `conn` in the room with `code`.
    pub async fn join_room(
        &mut self,
        code: &RoomCode,
        conn: ConnectionId,
        name: &str,
        sender: MemberSender,
    ) -> Result<Player, RoomError> {
        let handle = self.find_by_code(code).ok_or_else(|| RoomError::CodeNotFound(code.clone()))?;
        let room_id = handle.room_id();
        self.ensure_free(conn, Some(room_id))?;

        let player = handle.join(conn, name.to_owned(), sender).await?;
        self.members.insert(conn, room_id);
        Ok(player)
    }

    /// Binds `conn` to its seat in the room with `code` (see
    /// [`RoomHandle::lookup`]) and re-indexes the connection if the seat
    /// moved over from another one.
    pub async fn get_room_data(
        &mut self,
        code: &RoomCode,
        conn: ConnectionId,
        name: Option<String>,
        sender: MemberSender,
    ) -> Result<Rebound, RoomError> {
        let handle = self.find_by_code(code).ok_or_else(|| RoomError::CodeNotFound(code.clone()))?;
        let room_id = handle.room_id();
        self.ensure_free(conn, Some(room_id))?;

        let rebound = handle.lookup(conn, name, sender).await?;
        if rebound.previous != conn {
            self.members.remove(&rebound.previous);
        }
        self.members.insert(conn, room_id);
        Ok(rebound)
    }

    /// Moves the seat held by `old` in `room_id` over to `new`.
    pub async fn reassign_connection(
        &mut self,
        room_id: RoomId,
        old: ConnectionId,
        new: ConnectionId,
        sender: MemberSender,
    ) -> Result<Player, RoomError> {
        let handle = self.get(room_id).ok_or(RoomError::NotFound(room_id))?;
        self.ensure_free(new, Some(room_id))?;

        let player = handle.reassign(old, new, sender).await?;
        self.members.remove(&old);
        self.members.insert(new, room_id);
        Ok(player)
    }

    /// Unseats `conn` from whatever room it is in. An emptied room is
    /// destroyed.
    ///
    /// Returns `None` when the connection wasn't seated anywhere.
    pub async fn remove_player(
        &mut self,
        conn: ConnectionId,
    ) -> Result<Option<Departure>, RoomError> {
        let Some(room_id) = self.members.remove(&conn) else {
            return Ok(None);
        };
        let Some(handle) = self.get(room_id) else {
            return Ok(None);
        };

        let departure = handle.leave(conn).await?;
        if departure.remaining == 0 {
            self.destroy_room(room_id).await?;
        }
        Ok(Some(departure))
    }

    /// `true` once the room has four players and all are ready.
    pub async fn all_ready(&self, room_id: RoomId) -> Result<bool, RoomError> {
        let handle = self.get(room_id).ok_or(RoomError::NotFound(room_id))?;
        Ok(handle.snapshot().await?.all_ready())
    }

    /// Shuts down a room and forgets its code and members.
    pub async fn destroy_room(&mut self, room_id: RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        self.codes.remove(handle.code());
        self.members.retain(|_, rid| *rid != room_id);
        let _ = handle.shutdown().await;

        tracing::info!(%room_id, code = %handle.code(), "room destroyed");
        Ok(())
    }

    /// Shuts down every room.
    pub async fn shutdown(&mut self) {
        for (_, handle) in self.rooms.drain() {
            let _ = handle.shutdown().await;
        }
        self.codes.clear();
        self.members.clear();
    }

    pub fn get(&self, room_id: RoomId) -> Option<RoomHandle> {
        self.rooms.get(&room_id).cloned()
    }

    pub fn find_by_code(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.codes.get(code).and_then(|id| self.get(*id))
    }

    /// Room the connection is seated in, if any.
    pub fn room_of(&self, conn: ConnectionId) -> Option<RoomId> {
        self.members.get(&conn).copied()
    }

    /// Handle of the room `conn` is seated in.
    pub fn handle_for(&self, conn: ConnectionId) -> Result<RoomHandle, RoomError> {
        self.room_of(conn)
            .and_then(|id| self.get(id))
            .ok_or(RoomError::NotInRoom(conn))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }

    /// Enforces one room per connection. Being in `allowed` already is
    /// fine (idempotent joins and lookups).
    fn ensure_free(&self, conn: ConnectionId, allowed: Option<RoomId>) -> Result<(), RoomError> {
        match self.members.get(&conn) {
            Some(&current) if Some(current) != allowed => {
                Err(RoomError::AlreadyInRoom(conn, current))
            }
            _ => Ok(()),
        }
    }

    /// Draws codes until one isn't taken, up to [`CODE_ATTEMPTS`] times.
    fn generate_code(&self) -> Result<RoomCode, RoomError> {
        if self.config.code_length == 0 {
            return Err(RoomError::NoFreeCode);
        }
        let mut rng = rand::rng();
        for _ in 0..CODE_ATTEMPTS {
            let code: String = (0..self.config.code_length)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            let code = RoomCode::new(code);
            if !self.codes.contains_key(&code) {
                return Ok(code);
            }
        }
        Err(RoomError::NoFreeCode)
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
