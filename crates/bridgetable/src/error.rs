//! Unified error type for the bridgetable server.

use bridgetable_game::GameError;
use bridgetable_protocol::ProtocolError;
use bridgetable_session::SinkError;
use bridgetable_transport::TransportError;

/// Top-level error wrapping every layer's error.
///
/// Game errors normally end up as an `error` event to the requester and
/// never surface here; the variant exists for embedders driving the
/// registry directly.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Binding, accepting, reading or writing a socket.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encoding an event or decoding a command.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rejected table or session operation.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Preparing the history directory.
    #[error(transparent)]
    Sink(#[from] SinkError),
}
