//! Identity types and message addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// One connection is one player: the server derives the id from the
/// transport's connection id when the socket is accepted. Newtype so a
/// player id can never be confused with a seat index or a round number.
///
/// `#[serde(transparent)]` serializes `PlayerId(42)` as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The join code of a four-seat session, e.g. `"aZ3k9Q"`.
///
/// Codes are short alphanumeric strings handed to the creator and typed
/// in by the other three players, so they are kept as strings rather
/// than numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Length of generated session codes.
    pub const CODE_LEN: usize = 6;

    /// Wraps an existing code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Specifies who should receive a server event.
///
/// Game operations return a list of `(Recipient, ServerEvent)` pairs and
/// the session actor fans them out to the players' outbound queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every player currently in the session.
    All,

    /// One specific player: private hands, per-player state views and
    /// error replies.
    Player(PlayerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&SessionId::new("aZ3k9Q")).unwrap();
        assert_eq!(json, "\"aZ3k9Q\"");
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "aZ3k9Q");
    }

    #[test]
    fn test_session_id_display_is_the_code() {
        assert_eq!(SessionId::new("x1y2z3").to_string(), "x1y2z3");
    }
}
