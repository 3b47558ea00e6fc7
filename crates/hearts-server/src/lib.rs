//! # Hearts server
//!
//! A WebSocket server for four-player Hearts. Clients exchange JSON
//! frames of the form `{"event": ..., "data": ...}`; the server is the
//! single authority over rooms, hands, and scores.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hearts_server::prelude::*;
//!
//! # async fn run() -> Result<(), ServerError> {
//! let server = HeartsServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{HeartsServer, HeartsServerBuilder};

pub mod prelude {
    //! Everything needed to run the server or talk to it in tests.

    pub use crate::{HeartsServer, HeartsServerBuilder, ServerConfig, ServerError};
    pub use hearts_protocol::{ClientEvent, Codec, ConnectionId, JsonCodec, RoomCode, RoomId};
    pub use hearts_room::{GameState, Player, Room, RoomConfig, RoomEvent};
}
