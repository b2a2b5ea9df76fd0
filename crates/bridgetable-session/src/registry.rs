//! Session registry: creates sessions, tracks which player is where, and
//! routes commands to session actors.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bridgetable_game::{Game, GameError, RoundHistoryRecord};
use bridgetable_protocol::{ClientCommand, PlayerId, SessionId};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::actor::spawn_session;
use crate::{HistorySink, PlayerSender, SessionHandle, SessionInfo};

/// Command channel size for session actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// All live sessions and the player index.
///
/// A player is in at most one session. The registry is the only writer of
/// both maps; the server keeps it behind one `tokio::sync::Mutex`.
pub struct SessionRegistry {
    sessions: HashMap<SessionId, SessionHandle>,
    player_sessions: HashMap<PlayerId, SessionId>,
    sink: Arc<dyn HistorySink>,
    deal_seed: Option<u64>,
}

impl SessionRegistry {
    pub fn new(sink: Arc<dyn HistorySink>) -> Self {
        Self {
            sessions: HashMap::new(),
            player_sessions: HashMap::new(),
            sink,
            deal_seed: None,
        }
    }

    /// Deals every session's cards from a generator seeded with `seed`.
    pub fn with_deal_seed(mut self, seed: u64) -> Self {
        self.deal_seed = Some(seed);
        self
    }

    /// Handles any client command for `player`: session commands here,
    /// table commands on the player's session actor.
    pub async fn dispatch(
        &mut self,
        player: PlayerId,
        command: ClientCommand,
        sender: &PlayerSender,
    ) -> Result<(), GameError> {
        match command {
            ClientCommand::CreateSession => {
                self.create_session(player, sender.clone()).await;
                Ok(())
            }
            ClientCommand::JoinSession { session_id } => {
                self.join_session(player, &session_id, sender.clone()).await
            }
            other => self.route(player, other).await,
        }
    }

    fn fresh_code(&self) -> SessionId {
        let mut rng = rand::rng();
        loop {
            let code: String = (&mut rng)
                .sample_iter(Alphanumeric)
                .take(SessionId::CODE_LEN)
                .map(char::from)
                .collect();
            let id = SessionId::new(code);
            if !self.sessions.contains_key(&id) {
                return id;
            }
        }
    }

    /// Opens a new session with `player` as host, leaving any session the
    /// player was in.
    pub async fn create_session(&mut self, player: PlayerId, sender: PlayerSender) -> SessionId {
        self.leave(player).await;

        let session_id = self.fresh_code();
        let (game, initial) = Game::create(session_id.clone(), player);
        let handle = spawn_session(
            game,
            player,
            sender,
            initial,
            Arc::clone(&self.sink),
            self.deal_seed,
            DEFAULT_CHANNEL_SIZE,
        );
        self.sessions.insert(session_id.clone(), handle);
        self.player_sessions.insert(player, session_id.clone());
        tracing::info!(%session_id, %player, "session created");
        session_id
    }

    /// Adds `player` to an existing session. On success, any other
    /// session the player was in is left.
    pub async fn join_session(
        &mut self,
        player: PlayerId,
        session_id: &SessionId,
        sender: PlayerSender,
    ) -> Result<(), GameError> {
        let handle = self
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| GameError::SessionNotFound(session_id.clone()))?;

        if let Err(err) = handle.join(player, sender).await {
            if handle.is_closed() {
                self.purge(session_id);
            }
            return Err(err);
        }

        let previous = self.player_sessions.insert(player, session_id.clone());
        if let Some(previous) = previous.filter(|p| p != session_id) {
            self.leave_session(player, &previous).await;
        }
        Ok(())
    }

    /// Forwards a table command to the player's session.
    pub async fn route(&mut self, player: PlayerId, command: ClientCommand) -> Result<(), GameError> {
        let session_id = self
            .player_sessions
            .get(&player)
            .cloned()
            .ok_or(GameError::NotInSession)?;
        let Some(handle) = self.sessions.get(&session_id) else {
            self.player_sessions.remove(&player);
            return Err(GameError::NotInSession);
        };

        let result = handle.send_command(player, command).await;
        if result.is_err() {
            self.purge(&session_id);
        }
        result
    }

    /// Disconnect cleanup: removes `player` from their session and tears
    /// the session down if nobody is left. Returns the session left.
    pub async fn leave(&mut self, player: PlayerId) -> Option<SessionId> {
        let session_id = self.player_sessions.remove(&player)?;
        self.leave_session(player, &session_id).await;
        Some(session_id)
    }

    async fn leave_session(&mut self, player: PlayerId, session_id: &SessionId) {
        let Some(handle) = self.sessions.get(session_id).cloned() else {
            return;
        };
        match handle.leave(player).await {
            Ok(0) => {
                tracing::info!(%session_id, "last player left");
                let _ = self.remove_session(session_id).await;
            }
            Ok(remaining) => {
                tracing::debug!(%session_id, %player, remaining, "player left session");
            }
            Err(_) => self.purge(session_id),
        }
    }

    /// Stops a session and forgets its players. Returns the rounds it
    /// played; the actor archives them to the sink after replying, so the
    /// registry is never held up by history I/O.
    pub async fn remove_session(
        &mut self,
        session_id: &SessionId,
    ) -> Result<Vec<RoundHistoryRecord>, GameError> {
        let handle = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| GameError::SessionNotFound(session_id.clone()))?;
        self.player_sessions.retain(|_, s| s != session_id);
        let history = handle.shutdown().await;
        tracing::info!(%session_id, "session removed");
        history
    }

    /// Drops a session whose actor is gone.
    fn purge(&mut self, session_id: &SessionId) {
        if self.sessions.remove(session_id).is_some() {
            self.player_sessions.retain(|_, s| s != session_id);
            tracing::warn!(%session_id, "session actor unavailable, removed");
        }
    }

    /// Tears down every session idle for longer than `idle_timeout`, and
    /// any whose actor has stopped. Returns the ids removed.
    pub async fn reap_idle(&mut self, idle_timeout: Duration) -> Vec<SessionId> {
        let mut idle = Vec::new();
        let mut dead = Vec::new();
        for (session_id, handle) in &self.sessions {
            match handle.info().await {
                Ok(info) if info.last_activity.elapsed() > idle_timeout => {
                    tracing::info!(
                        %session_id,
                        idle_secs = info.last_activity.elapsed().as_secs(),
                        rounds = info.rounds_recorded,
                        round = info.round,
                        phase = %info.phase,
                        "reaping idle session"
                    );
                    idle.push(session_id.clone());
                }
                Ok(_) => {}
                Err(_) => dead.push(session_id.clone()),
            }
        }

        for session_id in &dead {
            self.purge(session_id);
        }
        for session_id in &idle {
            let _ = self.remove_session(session_id).await;
        }
        idle.extend(dead);
        idle
    }

    pub fn session_of(&self, player: PlayerId) -> Option<&SessionId> {
        self.player_sessions.get(&player)
    }

    pub fn handle(&self, session_id: &SessionId) -> Option<SessionHandle> {
        self.sessions.get(session_id).cloned()
    }

    pub async fn session_info(&self, session_id: &SessionId) -> Result<SessionInfo, GameError> {
        self.sessions
            .get(session_id)
            .ok_or_else(|| GameError::SessionNotFound(session_id.clone()))?
            .info()
            .await
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.keys().cloned().collect()
    }
}
