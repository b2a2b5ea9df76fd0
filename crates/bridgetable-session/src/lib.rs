//! Session management for bridgetable.
//!
//! Each session runs as an isolated Tokio task that owns its
//! [`Game`](bridgetable_game::Game); the [`SessionRegistry`] maps session
//! codes to actor handles and players to sessions, and a background
//! reaper retires sessions that have gone quiet.
//!
//! # Key types
//!
//! - [`SessionRegistry`]: create/join/route/leave, idle sweeps
//! - [`SessionHandle`]: send commands to a running session actor
//! - [`spawn_reaper`], [`ReaperConfig`]: the inactivity reaper
//! - [`HistorySink`]: where finished rounds and archives are written

mod actor;
mod config;
mod error;
mod reaper;
mod registry;
mod sink;

pub use actor::{PlayerSender, SessionHandle, SessionInfo};
pub use config::ReaperConfig;
pub use error::SinkError;
pub use reaper::spawn_reaper;
pub use registry::SessionRegistry;
pub use sink::{HistorySink, JsonFileSink, MemorySink, NullSink, SessionArchive};
