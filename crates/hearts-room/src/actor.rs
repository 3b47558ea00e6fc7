//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Each room runs in its own task and is only reachable through its
//! command channel. Operations on one room are therefore applied strictly
//! one after another, while different rooms proceed in parallel. After
//! every successful mutation the actor pushes the resulting events (each
//! with a full snapshot) to the members' outbound channels.

use std::collections::HashMap;

use hearts_engine::{CardId, find_winner};
use hearts_protocol::{ConnectionId, Recipient, RoomCode, RoomId};
use tokio::sync::{mpsc, oneshot};

use crate::{
    GameError, MemberSender, Outbound, PassOutcome, PlayOutcome, Player, Room, RoomError,
    RoomEvent,
};

/// Work run against the actor's state. The closure carries its own reply
/// channel.
type Job = Box<dyn FnOnce(&mut RoomActor) + Send>;

enum RoomCommand {
    Apply(Job),
    Shutdown,
}

/// Result of a leave request.
#[derive(Debug, Clone)]
pub struct Departure {
    /// The player who left, or `None` if the connection held no seat.
    pub player: Option<Player>,
    /// Players still seated afterwards.
    pub remaining: usize,
}

impl Departure {
    pub fn left(&self) -> bool {
        self.player.is_some()
    }
}

/// Result of binding a connection to a seat through `getRoomData`.
#[derive(Debug, Clone)]
pub struct Rebound {
    pub player: Player,
    /// Connection the seat was bound to before. Equal to the caller's own
    /// connection when nothing moved.
    pub previous: ConnectionId,
}

/// Handle to a running room actor.
///
/// Cheap to clone: it's an `mpsc::Sender` plus the room's identity. Callers
/// clone it out of the store so they can await the actor without holding
/// the store's lock.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Runs `f` inside the actor and waits for its result.
    async fn request<T: Send + 'static>(
        &self,
        f: impl FnOnce(&mut RoomActor) -> T + Send + 'static,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |actor| {
            let _ = reply_tx.send(f(actor));
        });
        self.sender
            .send(RoomCommand::Apply(job))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Seats `conn` in the room and subscribes `sender` to its events.
    pub async fn join(
        &self,
        conn: ConnectionId,
        name: String,
        sender: MemberSender,
    ) -> Result<Player, RoomError> {
        Ok(self.request(move |a| a.join(conn, &name, sender)).await??)
    }

    pub async fn leave(&self, conn: ConnectionId) -> Result<Departure, RoomError> {
        self.request(move |a| a.leave(conn)).await
    }

    /// Finds the caller's seat (by connection, then name, then optionally
    /// the host's) and binds `conn` and `sender` to it.
    pub async fn lookup(
        &self,
        conn: ConnectionId,
        name: Option<String>,
        sender: MemberSender,
    ) -> Result<Rebound, RoomError> {
        Ok(self
            .request(move |a| a.lookup(conn, name.as_deref(), sender))
            .await??)
    }

    pub async fn reassign(
        &self,
        old: ConnectionId,
        new: ConnectionId,
        sender: MemberSender,
    ) -> Result<Player, RoomError> {
        Ok(self.request(move |a| a.reassign(old, new, sender)).await??)
    }

    /// Sets readiness; the game starts by itself once all four are ready.
    pub async fn set_ready(&self, conn: ConnectionId, ready: bool) -> Result<(), RoomError> {
        Ok(self.request(move |a| a.set_ready(conn, ready)).await??)
    }

    pub async fn pass_cards(
        &self,
        conn: ConnectionId,
        card_ids: Vec<CardId>,
    ) -> Result<PassOutcome, RoomError> {
        Ok(self.request(move |a| a.pass(conn, &card_ids)).await??)
    }

    pub async fn play_card(
        &self,
        conn: ConnectionId,
        card_id: CardId,
    ) -> Result<PlayOutcome, RoomError> {
        Ok(self.request(move |a| a.play(conn, card_id)).await??)
    }

    pub async fn update_end_point(&self, conn: ConnectionId, value: i64) -> Result<u32, RoomError> {
        Ok(self.request(move |a| a.end_point(conn, value)).await??)
    }

    /// Current state of the room.
    pub async fn snapshot(&self) -> Result<Room, RoomError> {
        self.request(|a| a.room.clone()).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    /// Per-member outbound channels.
    senders: HashMap<ConnectionId, MemberSender>,
    host_fallback: bool,
}

impl RoomActor {
    /// Processes commands until shutdown or until every handle is gone.
    async fn run(mut self, mut receiver: mpsc::Receiver<RoomCommand>) {
        let room_id = self.room.id;
        tracing::info!(%room_id, code = %self.room.code, "room actor started");

        if let Some(host) = self.room.players.first().cloned() {
            let created = RoomEvent::RoomCreated {
                room: self.room.clone(),
                player: host.clone(),
            };
            self.dispatch(vec![(Recipient::Connection(host.id), created)]);
        }

        while let Some(cmd) = receiver.recv().await {
            match cmd {
                RoomCommand::Apply(job) => job(&mut self),
                RoomCommand::Shutdown => {
                    tracing::info!(%room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(%room_id, "room actor stopped");
    }

    fn join(
        &mut self,
        conn: ConnectionId,
        name: &str,
        sender: MemberSender,
    ) -> Result<Player, GameError> {
        let player = self.room.add_player(conn, name)?.clone();
        self.senders.insert(conn, sender);
        tracing::info!(
            room_id = %self.room.id,
            %conn,
            name = %player.name,
            players = self.room.players.len(),
            "player joined"
        );

        let room = self.room.clone();
        self.dispatch(vec![
            (
                Recipient::Connection(conn),
                RoomEvent::RoomJoined {
                    room: room.clone(),
                    player: player.clone(),
                },
            ),
            (
                Recipient::All,
                RoomEvent::PlayerJoined {
                    player: player.clone(),
                    room,
                },
            ),
        ]);
        Ok(player)
    }

    /// Unseats `conn`. A table abandoned mid-game is over: the rest get
    /// `playerLeft` and then `gameOver` for the standing scores.
    fn leave(&mut self, conn: ConnectionId) -> Departure {
        let was_active = self.room.game_state.is_active();
        let player = self.room.remove_player(conn);
        self.senders.remove(&conn);
        let remaining = self.room.players.len();

        if player.is_some() {
            tracing::info!(
                room_id = %self.room.id,
                %conn,
                remaining,
                state = %self.room.game_state,
                "player left"
            );
            if remaining > 0 {
                let room = self.room.clone();
                let mut events = vec![(
                    Recipient::All,
                    RoomEvent::PlayerLeft {
                        player_id: conn,
                        room: room.clone(),
                    },
                )];
                if was_active {
                    if let Some(seat) = find_winner(&self.room.players) {
                        let winner = self.room.players[seat].clone();
                        events.push((Recipient::All, RoomEvent::GameOver { winner, room }));
                    }
                }
                self.dispatch(events);
            }
        }

        Departure { player, remaining }
    }

    fn lookup(
        &mut self,
        conn: ConnectionId,
        name: Option<&str>,
        sender: MemberSender,
    ) -> Result<Rebound, GameError> {
        let seat = self
            .room
            .resolve_seat(conn, name, self.host_fallback)
            .ok_or(GameError::PlayerNotFound)?;
        let previous = self.room.players[seat].id;

        if previous != conn {
            self.room.reassign_connection(previous, conn)?;
            self.senders.remove(&previous);
            tracing::info!(room_id = %self.room.id, from = %previous, to = %conn, "seat re-bound");
        }
        self.senders.insert(conn, sender);

        let player = self.room.players[seat].clone();
        let received = RoomEvent::RoomDataReceived {
            room: self.room.clone(),
            player: player.clone(),
        };
        self.dispatch(vec![(Recipient::Connection(conn), received)]);
        Ok(Rebound { player, previous })
    }

    fn reassign(
        &mut self,
        old: ConnectionId,
        new: ConnectionId,
        sender: MemberSender,
    ) -> Result<Player, GameError> {
        let player = self.room.reassign_connection(old, new)?.clone();
        self.senders.remove(&old);
        self.senders.insert(new, sender);
        Ok(player)
    }

    fn set_ready(&mut self, conn: ConnectionId, ready: bool) -> Result<(), GameError> {
        self.room.set_ready(conn, ready)?;

        let mut events = vec![(
            Recipient::All,
            RoomEvent::PlayerReady {
                player_id: conn,
                is_ready: ready,
                room: self.room.clone(),
            },
        )];

        if self.room.all_ready() {
            match self.room.start_game() {
                Ok(()) => events.push((
                    Recipient::All,
                    RoomEvent::GameStarted {
                        room: self.room.clone(),
                    },
                )),
                Err(err) => {
                    tracing::warn!(room_id = %self.room.id, error = %err, "auto-start failed");
                }
            }
        }

        self.dispatch(events);
        Ok(())
    }

    fn pass(&mut self, conn: ConnectionId, card_ids: &[CardId]) -> Result<PassOutcome, GameError> {
        let outcome = self.room.pass_cards(conn, card_ids)?;

        let room = self.room.clone();
        let mut events = vec![(Recipient::All, RoomEvent::CardsPassed { room: room.clone() })];
        if outcome.exchanged {
            events.push((Recipient::All, RoomEvent::CardsExchanged { room }));
        }
        self.dispatch(events);
        Ok(outcome)
    }

    fn play(&mut self, conn: ConnectionId, card_id: CardId) -> Result<PlayOutcome, GameError> {
        let outcome = self.room.play_card(conn, card_id)?;
        tracing::debug!(room_id = %self.room.id, %conn, card = %outcome.card, "card played");

        let room = self.room.clone();
        let mut events = vec![(
            Recipient::All,
            RoomEvent::CardPlayed {
                player_id: conn,
                card: outcome.card,
                room: room.clone(),
            },
        )];

        match (&outcome.trick, &outcome.round) {
            (Some(trick), None) => events.push((
                Recipient::All,
                RoomEvent::TrickCompleted {
                    winner_id: trick.winner,
                    points: trick.points,
                    room,
                },
            )),
            (_, Some(round)) => match round.winner.and_then(|id| self.room.player(id)) {
                Some(winner) => events.push((
                    Recipient::All,
                    RoomEvent::GameOver {
                        winner: winner.clone(),
                        room,
                    },
                )),
                None => events.push((Recipient::All, RoomEvent::NewRound { room })),
            },
            (None, None) => {}
        }

        self.dispatch(events);
        Ok(outcome)
    }

    fn end_point(&mut self, conn: ConnectionId, value: i64) -> Result<u32, GameError> {
        let end_point = self.room.update_end_point(conn, value)?;
        tracing::info!(room_id = %self.room.id, end_point, "end point updated");

        let updated = RoomEvent::EndPointUpdated {
            end_point,
            room: self.room.clone(),
        };
        self.dispatch(vec![(Recipient::All, updated)]);
        Ok(end_point)
    }

    /// Delivers each event to every member its recipient covers.
    fn dispatch(&self, events: Vec<Outbound>) {
        for (recipient, event) in events {
            for (conn, sender) in &self.senders {
                if recipient.includes(*conn) {
                    // A closed channel means the member is disconnecting;
                    // their leave request is already on its way.
                    let _ = sender.send(event.clone());
                }
            }
        }
    }
}

/// Spawns a room actor owning `room` and returns a handle to it.
///
/// The room's first player is the host; `host_sender` subscribes them and
/// receives `roomCreated` as soon as the actor starts. `channel_size`
/// bounds the command queue.
pub(crate) fn spawn_room(
    room: Room,
    host_sender: MemberSender,
    host_fallback: bool,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let room_id = room.id;
    let code = room.code.clone();

    let mut senders = HashMap::new();
    if let Some(host) = room.players.first() {
        senders.insert(host.id, host_sender);
    }

    let actor = RoomActor {
        room,
        senders,
        host_fallback,
    };
    tokio::spawn(actor.run(rx));

    RoomHandle {
        room_id,
        code,
        sender: tx,
    }
}
