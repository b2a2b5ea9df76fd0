//! Error types for the protocol layer.

/// A frame that could not become a command, or an event that could not
/// become a frame.
///
/// Everything here is caught at the dispatcher: the game engine never
/// sees a frame that failed to decode.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[cfg(feature = "json")]
    #[error("cannot serialize event: {0}")]
    Encode(serde_json::Error),

    /// The frame looked like JSON but is not a known command.
    #[cfg(feature = "json")]
    #[error("not a valid JSON command: {0}")]
    Decode(serde_json::Error),

    /// A text command with the wrong arity, an unknown suit, a rank
    /// outside 0-12, a level/denomination mismatch and the like.
    #[error("{0}")]
    BadCommand(String),
}
