//! Transport layer for the Hearts server.
//!
//! Provides the [`Transport`] and [`Connection`] traits so the session
//! router never touches sockets directly, plus a WebSocket implementation.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a live connection.
///
/// This is the only player identity the server knows about. It is
/// serialized as a plain number (`"id": 7`), and a player's id changes
/// when they reconnect on a new socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// One inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Payload of a text or binary frame.
    Data(Vec<u8>),
    /// A ping or pong. Carries nothing but shows the peer is alive.
    KeepAlive,
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Address the listener is bound to.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// A single connection that exchanges text frames.
///
/// Sending and receiving use independent halves, so one task can block in
/// [`recv`](Connection::recv) while another pushes outbound frames.
pub trait Connection: Clone + Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one text frame to the remote peer.
    async fn send(&self, frame: &str) -> Result<(), Self::Error>;

    /// Receives the next frame.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Frame>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Remote address of the peer.
    fn peer_addr(&self) -> SocketAddr;
}
