use std::io;
use std::time::Duration;

/// Socket-level failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("tcp accept failed: {0}")]
    Accept(#[source] io::Error),

    /// The HTTP upgrade to WebSocket did not complete.
    #[error("websocket upgrade failed: {0}")]
    Upgrade(String),

    #[error("websocket upgrade not completed within {0:?}")]
    HandshakeTimeout(Duration),

    #[error("peer is gone")]
    Closed,

    /// A binary frame that is not UTF-8.
    #[error("frame is not text")]
    NotText,

    #[error("websocket error: {0}")]
    Socket(String),
}
