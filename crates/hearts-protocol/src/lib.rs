//! Wire protocol for the Hearts server.
//!
//! - **Types** ([`ClientEvent`], [`RoomId`], [`RoomCode`], [`Recipient`]):
//!   what clients send and how rooms and members are addressed.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames are turned
//!   into events and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing so.
//!
//! Outbound events carry room snapshots and therefore live with the room
//! model (`hearts-room`); this crate only fixes the framing they share.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use hearts_transport::ConnectionId;
pub use types::{ClientEvent, Recipient, RoomCode, RoomId};
