//! Rooms for the Hearts server.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! [`Room`]: the players, the cards, and the game in progress. The
//! [`RoomStore`] creates rooms and routes connections to them.
//!
//! # Key types
//!
//! - [`RoomStore`]: creates/destroys rooms, indexes codes and connections
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Room`], [`Player`]: the room model, also the snapshot clients see
//! - [`RoomEvent`]: everything pushed to clients
//! - [`GameState`]: the game-phase state machine
//! - [`RoomConfig`]: room settings (end point bounds, code length, etc.)

mod actor;
mod config;
mod controller;
mod error;
mod event;
mod room;
mod store;

pub use actor::{Departure, Rebound, RoomHandle};
pub use config::{GameState, RoomConfig};
pub use controller::{CompletedTrick, PASS_SIZE, PassOutcome, PlayOutcome, RoundEnd};
pub use error::{GameError, RoomError};
pub use event::{MemberSender, Outbound, RoomEvent};
pub use room::{Player, Room, TABLE_SIZE};
pub use store::RoomStore;
