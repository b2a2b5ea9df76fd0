//! Socket layer for bridgetable.
//!
//! The server is written against three small traits: a [`Listener`] that
//! hands out raw connections, a [`Handshake`] that upgrades one of them,
//! and a [`FrameStream`] that moves whole text frames. Every bridge message is a UTF-8 frame (a JSON document or a
//! colon-delimited command line), so nothing above this crate handles
//! bytes.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WsListener`] / [`WsIncoming`] / [`WsPeer`]
//!   over `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod peer_id;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use peer_id::PeerId;
#[cfg(feature = "websocket")]
pub use websocket::{DEFAULT_HANDSHAKE_TIMEOUT, WsIncoming, WsListener, WsPeer};

use std::net::SocketAddr;

/// Source of newly connected peers.
pub trait Listener: Send + Sync + 'static {
    type Incoming: Handshake;

    /// Waits for the next connection. The protocol upgrade is left to
    /// [`Handshake::upgrade`] so one silent client cannot hold up the
    /// accept loop.
    async fn accept(&mut self) -> Result<Self::Incoming, TransportError>;

    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// An accepted connection that has not finished its upgrade yet.
pub trait Handshake: Send + 'static {
    type Peer: FrameStream;

    /// Completes the upgrade, giving up after the listener's handshake
    /// timeout.
    async fn upgrade(self) -> Result<Self::Peer, TransportError>;

    fn peer_addr(&self) -> SocketAddr;
}

/// One connected peer exchanging text frames.
///
/// `send_frame` and `next_frame` may run at the same time from two
/// tasks: the dispatcher reads on one while a writer task drains the
/// peer's outbound queue on the other.
pub trait FrameStream: Send + Sync + 'static {
    async fn send_frame(&self, frame: &str) -> Result<(), TransportError>;

    /// `Ok(None)` once the peer has closed.
    async fn next_frame(&self) -> Result<Option<String>, TransportError>;

    async fn close(&self) -> Result<(), TransportError>;

    fn peer_id(&self) -> PeerId;

    fn peer_addr(&self) -> SocketAddr;
}
