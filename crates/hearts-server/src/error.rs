//! Unified error type for the Hearts server.

use hearts_protocol::ProtocolError;
use hearts_room::RoomError;
use hearts_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, rejected move, room gone).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Invalid configuration, e.g. an unparsable environment variable.
    #[error("invalid configuration: {0}")]
    Config(String),
}
