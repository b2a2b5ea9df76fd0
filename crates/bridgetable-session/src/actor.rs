//! Session actor: a Tokio task that owns one [`Game`].
//!
//! Every read or mutation of a game is a message on the actor's channel,
//! so each operation runs to completion before the next one starts. The
//! actor never awaits a socket: events go to per-player unbounded queues
//! drained by the connection's writer task.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use bridgetable_game::{Deck, Game, GameError, Outbound, Phase, RoundHistoryRecord, ServerEvent};
use bridgetable_protocol::{Card, ClientCommand, PlayerId, Recipient, SessionId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::{HistorySink, SessionArchive};

/// Outbound event queue of one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

pub(crate) enum SessionCommand {
    Join {
        player: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), GameError>>,
    },

    /// Replies with the number of players left.
    Leave {
        player: PlayerId,
        reply: oneshot::Sender<usize>,
    },

    /// A game command; rejections go to the player's own queue.
    Command {
        player: PlayerId,
        command: ClientCommand,
    },

    GetInfo {
        reply: oneshot::Sender<SessionInfo>,
    },

    Inspect {
        reply: oneshot::Sender<Game>,
    },

    /// Stop. Replies with the rounds played, then archives them before
    /// the actor exits.
    Shutdown {
        reply: oneshot::Sender<Vec<RoundHistoryRecord>>,
    },

    /// Panics inside the game boundary.
    #[cfg(test)]
    Fault { player: PlayerId },
}

/// Session metadata for the registry and the reaper.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub phase: Phase,
    pub player_count: usize,
    pub round: u32,
    pub rounds_recorded: usize,
    /// When a request last succeeded.
    pub last_activity: Instant,
}

/// Cheap, cloneable handle to a running session actor.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    fn unavailable(&self) -> GameError {
        GameError::SessionNotFound(self.session_id.clone())
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn join(&self, player: PlayerId, sender: PlayerSender) -> Result<(), GameError> {
        self.request(|reply| SessionCommand::Join {
            player,
            sender,
            reply,
        })
        .await?
    }

    /// Removes a player; returns how many remain.
    pub async fn leave(&self, player: PlayerId) -> Result<usize, GameError> {
        self.request(|reply| SessionCommand::Leave { player, reply })
            .await
    }

    /// Queues a game command (fire-and-forget).
    pub async fn send_command(
        &self,
        player: PlayerId,
        command: ClientCommand,
    ) -> Result<(), GameError> {
        self.sender
            .send(SessionCommand::Command { player, command })
            .await
            .map_err(|_| self.unavailable())
    }

    pub async fn info(&self) -> Result<SessionInfo, GameError> {
        self.request(|reply| SessionCommand::GetInfo { reply }).await
    }

    /// A snapshot of the game.
    pub async fn inspect(&self) -> Result<Game, GameError> {
        self.request(|reply| SessionCommand::Inspect { reply }).await
    }

    /// Stops the actor and returns its rounds. The archive is written
    /// after the reply; await [`closed`](Self::closed) to wait for it.
    pub async fn shutdown(&self) -> Result<Vec<RoundHistoryRecord>, GameError> {
        self.request(|reply| SessionCommand::Shutdown { reply })
            .await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Completes once the actor has exited, history archived.
    pub async fn closed(&self) {
        self.sender.closed().await;
    }

    #[cfg(test)]
    pub(crate) async fn inject_fault(&self, player: PlayerId) -> Result<(), GameError> {
        self.sender
            .send(SessionCommand::Fault { player })
            .await
            .map_err(|_| self.unavailable())
    }
}

struct SessionActor {
    game: Game,
    senders: HashMap<PlayerId, PlayerSender>,
    sink: Arc<dyn HistorySink>,
    rng: StdRng,
    last_activity: Instant,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    async fn run(mut self) {
        let session_id = self.game.session_id().clone();
        tracing::debug!(%session_id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Join {
                    player,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player, sender);
                    let _ = reply.send(result);
                }
                SessionCommand::Leave { player, reply } => {
                    let out = self.game.leave(player);
                    self.senders.remove(&player);
                    self.last_activity = Instant::now();
                    self.dispatch(out);
                    let _ = reply.send(self.game.seating().len());
                }
                SessionCommand::Command { player, command } => {
                    if !self.handle_command(player, command) {
                        self.archive().await;
                        break;
                    }
                }
                #[cfg(test)]
                SessionCommand::Fault { player } => {
                    if !self.guarded(player, "fault", |_, _| panic!("injected fault")) {
                        self.archive().await;
                        break;
                    }
                }
                SessionCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                SessionCommand::Inspect { reply } => {
                    let _ = reply.send(self.game.clone());
                }
                SessionCommand::Shutdown { reply } => {
                    // Reply first: the registry awaits it under its lock.
                    let _ = reply.send(self.game.history().to_vec());
                    self.archive().await;
                    break;
                }
            }
        }

        tracing::debug!(%session_id, "session actor stopped");
    }

    fn handle_join(&mut self, player: PlayerId, sender: PlayerSender) -> Result<(), GameError> {
        // Register the queue first so the state broadcast reaches the joiner.
        let previous = self.senders.insert(player, sender);
        match self.game.join(player) {
            Ok(out) => {
                self.last_activity = Instant::now();
                self.dispatch(out);
                Ok(())
            }
            Err(err) => {
                match previous {
                    Some(old) => {
                        self.senders.insert(player, old);
                    }
                    None => {
                        self.senders.remove(&player);
                    }
                }
                Err(err)
            }
        }
    }

    /// Runs one game command. Returns `false` if the game panicked and the
    /// session must stop.
    fn handle_command(&mut self, player: PlayerId, command: ClientCommand) -> bool {
        let name = command.name();
        self.guarded(player, name, |game, rng| apply(game, rng, player, command))
    }

    /// Applies `op` to the game, catching panics. Successful outcomes are
    /// dispatched and new rounds journaled; rejections and faults are
    /// reported to `player` only.
    fn guarded(
        &mut self,
        player: PlayerId,
        name: &'static str,
        op: impl FnOnce(&mut Game, &mut StdRng) -> Result<Outbound, GameError>,
    ) -> bool {
        let rounds_before = self.game.history().len();
        let game = &mut self.game;
        let rng = &mut self.rng;
        let result = catch_unwind(AssertUnwindSafe(|| op(game, rng)));

        match result {
            Ok(Ok(out)) => {
                self.last_activity = Instant::now();
                self.dispatch(out);
                self.record_new_rounds(rounds_before);
                true
            }
            Ok(Err(err)) => {
                tracing::debug!(
                    session_id = %self.game.session_id(),
                    %player,
                    command = name,
                    error = %err,
                    "request rejected"
                );
                self.send_to(player, ServerEvent::error(err.to_string()));
                true
            }
            Err(_) => {
                tracing::error!(
                    session_id = %self.game.session_id(),
                    %player,
                    command = name,
                    "game operation panicked, tearing down session"
                );
                self.send_to(player, ServerEvent::error(GameError::Internal.to_string()));
                false
            }
        }
    }

    fn record_new_rounds(&self, rounds_before: usize) {
        let history = self.game.history();
        if history.len() <= rounds_before {
            return;
        }
        let session_id = self.game.session_id().clone();
        let records = history[rounds_before..].to_vec();
        let sink = Arc::clone(&self.sink);
        tokio::task::spawn_blocking(move || {
            for record in &records {
                if let Err(e) = sink.record_round(&session_id, record) {
                    tracing::warn!(
                        %session_id,
                        round = record.game_number,
                        error = %e,
                        "failed to record round"
                    );
                }
            }
        });
    }

    /// Hands the full history to the sink. Best-effort.
    async fn archive(&self) {
        let history = self.game.history();
        if history.is_empty() {
            return;
        }
        let archive = SessionArchive::new(self.game.session_id().clone(), history.to_vec());
        let sink = Arc::clone(&self.sink);
        let session_id = archive.game_id.clone();
        match tokio::task::spawn_blocking(move || sink.archive(&archive)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(%session_id, error = %e, "failed to archive session history");
            }
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "history archive task failed");
            }
        }
    }

    /// Fans events out to their recipients' queues.
    fn dispatch(&self, out: Outbound) {
        for (recipient, event) in out {
            match recipient {
                Recipient::All => {
                    for &player in self.game.seating().players() {
                        self.send_to(player, event.clone());
                    }
                }
                Recipient::Player(player) => self.send_to(player, event),
            }
        }
    }

    /// Queues one event. A closed queue only means the connection is
    /// going away; its disconnect cleanup follows.
    fn send_to(&self, player: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player) {
            if sender.send(event).is_err() {
                tracing::debug!(
                    session_id = %self.game.session_id(),
                    %player,
                    "outbound queue closed, dropping event"
                );
            }
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.game.session_id().clone(),
            phase: self.game.phase(),
            player_count: self.game.seating().len(),
            round: self.game.round(),
            rounds_recorded: self.game.history().len(),
            last_activity: self.last_activity,
        }
    }
}

/// Routes a command to the matching game operation.
fn apply(
    game: &mut Game,
    rng: &mut StdRng,
    player: PlayerId,
    command: ClientCommand,
) -> Result<Outbound, GameError> {
    let name = command.name();
    match command {
        ClientCommand::ClaimSeat { seat } => game.claim_seat(player, &seat),
        ClientCommand::StartRound => game.start_round(player, Deck::shuffled(rng)),
        ClientCommand::SubmitBid {
            level,
            denomination,
            seat,
            display,
        } => game.submit_bid(player, level, denomination, seat, display),
        ClientCommand::PlayCard { suit, rank, seat } => {
            game.play_card(player, Card::new(suit, rank), seat)
        }
        ClientCommand::CreateSession | ClientCommand::JoinSession { .. } => Err(
            GameError::MalformedRequest(format!("{name} is not a table command")),
        ),
    }
}

/// Spawns an actor for `game`, which already has `host` as its only
/// player, and delivers `initial` events.
pub(crate) fn spawn_session(
    game: Game,
    host: PlayerId,
    host_sender: PlayerSender,
    initial: Outbound,
    sink: Arc<dyn HistorySink>,
    deal_seed: Option<u64>,
    channel_size: usize,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let session_id = game.session_id().clone();

    let rng = match deal_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let actor = SessionActor {
        game,
        senders: HashMap::from([(host, host_sender)]),
        sink,
        rng,
        last_activity: Instant::now(),
        receiver: rx,
    };
    actor.dispatch(initial);

    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        sender: tx,
    }
}
