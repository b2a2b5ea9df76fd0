//! Codec trait and implementations for turning messages into text frames.
//!
//! The dispatcher never names a concrete format: it encodes outbound
//! events and decodes inbound JSON commands through whatever implements
//! [`Codec`]. Frames are text because the WebSocket clients of a bridge
//! table speak JSON and the colon-delimited command lines, never binary.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to text frames and decodes text frames back.
///
/// `Send + Sync + 'static` so one codec instance can be shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Parses one text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame is malformed or does
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature (enabled by default).
///
/// ```rust
/// use bridgetable_protocol::{ClientCommand, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let frame = codec.encode(&ClientCommand::StartRound).unwrap();
/// assert_eq!(frame, r#"{"type":"start_round"}"#);
///
/// let back: ClientCommand = codec.decode(&frame).unwrap();
/// assert_eq!(back, ClientCommand::StartRound);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}
