//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the bytes on the wire were the problem,
//! never the game: an illegal card is a room error, a frame that isn't
//! JSON is a protocol error.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound event failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// An inbound frame was malformed, truncated, or named an unknown
    /// event.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but its contents break a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
