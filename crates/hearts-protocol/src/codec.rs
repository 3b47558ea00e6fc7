//! Codec trait and implementations for serializing/deserializing frames.
//!
//! The session router only needs something that turns events into text
//! frames and frames back into events. [`JsonCodec`] is the one the
//! browser client speaks.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values into text frames and decodes frames back.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes one frame's payload.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use hearts_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let event: ClientEvent = codec
///     .decode(br#"{"event":"setReady","data":{"isReady":true}}"#)
///     .unwrap();
/// assert_eq!(event, ClientEvent::SetReady { is_ready: true });
///
/// let frame = codec.encode(&event).unwrap();
/// assert!(frame.contains("\"setReady\""));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::ClientEvent;

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<ClientEvent, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_unknown_event_is_decode_error() {
        let result: Result<ClientEvent, _> =
            JsonCodec.decode(br#"{"event":"flyToMoon","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_produces_single_line_text() {
        let frame = JsonCodec
            .encode(&ClientEvent::PlayCard {
                card_id: hearts_engine::CardId::new(),
            })
            .unwrap();
        assert!(!frame.contains('\n'));
        assert!(frame.starts_with('{'));
    }
}
