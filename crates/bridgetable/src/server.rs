//! `BridgeServer` builder and server loop.
//!
//! Ties the layers together: the listener accepts sockets, each socket
//! gets a handler task, and handlers talk to the shared
//! [`SessionRegistry`].

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bridgetable_protocol::JsonCodec;
use bridgetable_session::{
    HistorySink, JsonFileSink, NullSink, ReaperConfig, SessionRegistry, SinkError, spawn_reaper,
};
use bridgetable_transport::{DEFAULT_HANDSHAKE_TIMEOUT, Handshake, Listener, WsListener};
use tokio::sync::Mutex;

use crate::BridgeError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    /// Shared with the reaper task.
    pub(crate) registry: Arc<Mutex<SessionRegistry>>,
    pub(crate) codec: JsonCodec,
}

/// Where finished rounds go.
enum History {
    Discard,
    Directory(PathBuf),
    Sink(Arc<dyn HistorySink>),
}

/// Builder for configuring and starting a bridge server.
///
/// # Example
///
/// ```rust,ignore
/// use bridgetable::prelude::*;
///
/// let server = BridgeServer::builder()
///     .bind("0.0.0.0:8000")
///     .reaper(ReaperConfig::default())
///     .history_dir("game_history")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct BridgeServerBuilder {
    bind_addr: String,
    reaper: ReaperConfig,
    history: History,
    deal_seed: Option<u64>,
    handshake_timeout: Duration,
}

impl BridgeServerBuilder {
    /// Creates a new builder with default settings: loopback on port
    /// 8000, default reaper timings, history discarded.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            reaper: ReaperConfig::default(),
            history: History::Discard,
            deal_seed: None,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn reaper(mut self, config: ReaperConfig) -> Self {
        self.reaper = config;
        self
    }

    /// Writes round journals and teardown archives as JSON under `dir`.
    /// The directory is created by [`build`](Self::build).
    pub fn history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history = History::Directory(dir.into());
        self
    }

    /// Sends history to a custom sink instead of the filesystem.
    pub fn sink(mut self, sink: Arc<dyn HistorySink>) -> Self {
        self.history = History::Sink(sink);
        self
    }

    /// Deals every session from a generator seeded with `seed`, making
    /// hands reproducible.
    pub fn deal_seed(mut self, seed: u64) -> Self {
        self.deal_seed = Some(seed);
        self
    }

    /// Drops connections that have not completed the WebSocket upgrade
    /// within `timeout`.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds the listener and prepares shared state.
    ///
    /// Uses `JsonCodec` for outbound events and a WebSocket listener.
    pub async fn build(self) -> Result<BridgeServer, BridgeError> {
        let sink: Arc<dyn HistorySink> = match self.history {
            History::Discard => Arc::new(NullSink),
            History::Directory(dir) => {
                std::fs::create_dir_all(&dir).map_err(SinkError::from)?;
                tracing::info!(dir = %dir.display(), "writing game history");
                Arc::new(JsonFileSink::new(dir))
            }
            History::Sink(sink) => sink,
        };

        let mut registry = SessionRegistry::new(sink);
        if let Some(seed) = self.deal_seed {
            registry = registry.with_deal_seed(seed);
        }

        let listener = WsListener::bind(&self.bind_addr)
            .await?
            .with_handshake_timeout(self.handshake_timeout);

        let state = Arc::new(ServerState {
            registry: Arc::new(Mutex::new(registry)),
            codec: JsonCodec,
        });

        Ok(BridgeServer {
            listener,
            state,
            reaper: self.reaper,
        })
    }
}

impl Default for BridgeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound bridge server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BridgeServer {
    listener: WsListener,
    state: Arc<ServerState>,
    reaper: ReaperConfig,
}

impl BridgeServer {
    pub fn builder() -> BridgeServerBuilder {
        BridgeServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// The session registry, shared with every connection.
    pub fn registry(&self) -> Arc<Mutex<SessionRegistry>> {
        Arc::clone(&self.state.registry)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), BridgeError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes, then tears down
    /// every live session so its history is archived.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), BridgeError> {
        let reaper = spawn_reaper(Arc::clone(&self.state.registry), self.reaper);
        tracing::info!(addr = ?self.local_addr().ok(), "bridge server running");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(incoming) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            let addr = incoming.peer_addr();
                            let peer = match incoming.upgrade().await {
                                Ok(peer) => peer,
                                Err(e) => {
                                    tracing::debug!(%addr, error = %e, "handshake failed");
                                    return;
                                }
                            };
                            if let Err(e) = handle_connection(peer, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        reaper.abort();
        let handles = {
            let mut registry = self.state.registry.lock().await;
            let mut handles = Vec::new();
            for session_id in registry.session_ids() {
                if let Some(handle) = registry.handle(&session_id) {
                    handles.push(handle);
                }
                let _ = registry.remove_session(&session_id).await;
            }
            handles
        };
        // Archives are written after each actor replies.
        for handle in &handles {
            handle.closed().await;
        }
        tracing::info!(sessions = handles.len(), "bridge server stopped");
        Ok(())
    }
}
