//! Per-connection handler: the thin dispatcher between a socket and the
//! session registry.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Assign the connection a `PlayerId` and an outbound event queue
//!   2. Spawn a writer task that encodes queued events onto the socket
//!   3. Loop: receive frames → decode a `ClientCommand` → dispatch
//!   4. On close, leave whatever session the player was in

use std::sync::Arc;

use bridgetable_game::{GameError, ServerEvent};
use bridgetable_protocol::{ClientCommand, Codec, JsonCodec, PlayerId};
use bridgetable_session::PlayerSender;
use bridgetable_transport::{FrameStream, TransportError, WsPeer};
use tokio::sync::mpsc;

use crate::BridgeError;
use crate::server::ServerState;

/// Drop guard that removes the player from their session when the
/// handler exits, including by panic. `Drop` is synchronous, so the
/// async cleanup runs as a fire-and-forget task.
struct LeaveGuard {
    player: PlayerId,
    state: Arc<ServerState>,
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        let player = self.player;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut registry = state.registry.lock().await;
            if let Some(session_id) = registry.leave(player).await {
                tracing::info!(%player, %session_id, "disconnected player left session");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    peer: WsPeer,
    state: Arc<ServerState>,
) -> Result<(), BridgeError> {
    let peer = Arc::new(peer);
    let player = PlayerId(peer.peer_id().get());
    tracing::info!(%player, addr = %peer.peer_addr(), "player connected");

    let (sender, outbound) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_events(Arc::clone(&peer), outbound, state.codec));

    let _guard = LeaveGuard {
        player,
        state: Arc::clone(&state),
    };

    let result = read_commands(&peer, &state, player, &sender).await;

    writer.abort();
    let _ = peer.close().await;
    // _guard drops here → the player leaves their session.
    result
}

/// Reads frames until the peer goes away.
async fn read_commands(
    peer: &WsPeer,
    state: &ServerState,
    player: PlayerId,
    sender: &PlayerSender,
) -> Result<(), BridgeError> {
    loop {
        let frame = match peer.next_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!(%player, "connection closed cleanly");
                return Ok(());
            }
            Err(TransportError::NotText) => {
                reject(sender, GameError::MalformedRequest("binary frame".into()));
                continue;
            }
            Err(e) => {
                tracing::debug!(%player, error = %e, "recv error");
                return Err(e.into());
            }
        };

        let command = match ClientCommand::from_frame(&frame, &state.codec) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(%player, error = %e, "malformed frame");
                reject(sender, GameError::MalformedRequest(e.to_string()));
                continue;
            }
        };

        tracing::debug!(%player, command = command.name(), "routing command");
        let result = state
            .registry
            .lock()
            .await
            .dispatch(player, command, sender)
            .await;

        if let Err(e) = result {
            tracing::debug!(%player, error = %e, "command rejected");
            reject(sender, e);
        }
    }
}

/// Drains the player's outbound queue onto the socket.
async fn write_events(
    peer: Arc<WsPeer>,
    mut outbound: mpsc::UnboundedReceiver<ServerEvent>,
    codec: JsonCodec,
) {
    while let Some(event) = outbound.recv().await {
        let frame = match codec.encode(&event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(event = event.kind(), error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = peer.send_frame(&frame).await {
            tracing::debug!(peer = %peer.peer_id(), error = %e, "send failed, stopping writer");
            break;
        }
    }
}

/// Queues an `error` event for the requester only.
fn reject(sender: &PlayerSender, err: GameError) {
    let _ = sender.send(ServerEvent::error(err.to_string()));
}
