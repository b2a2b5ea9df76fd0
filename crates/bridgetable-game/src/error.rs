//! Error types for the game engine.

use bridgetable_protocol::SessionId;

use crate::Phase;

/// Why a request was rejected.
///
/// Every variant is request-local: the game is left untouched and the
/// `Display` text is sent back to the requester as an `error` event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// No session with that code exists.
    #[error("Game not found")]
    SessionNotFound(SessionId),

    /// The session already has four players.
    #[error("Game is full")]
    SessionFull(SessionId),

    /// The requester has not created or joined a session.
    #[error("Not in a game")]
    NotInSession,

    /// The seat name is not one of north, south, east, west.
    #[error("Invalid direction")]
    InvalidSeat(String),

    /// The request names a seat whose turn it is not.
    #[error("Not your turn")]
    NotYourTurn,

    /// The request is not valid in the current phase.
    #[error("Not in {expected} phase")]
    WrongPhase { expected: Phase, actual: Phase },

    /// The requester lacks the right to perform the action.
    #[error("{0}")]
    IllegalAction(String),

    /// The frame could not be decoded into a command.
    #[error("Invalid request: {0}")]
    MalformedRequest(String),

    /// An operation failed unexpectedly; the session is torn down.
    #[error("Internal server error")]
    Internal,
}

impl GameError {
    pub(crate) fn illegal(reason: &str) -> Self {
        GameError::IllegalAction(reason.to_owned())
    }
}
