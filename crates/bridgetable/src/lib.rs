//! # bridgetable
//!
//! A four-seat contract bridge table server.
//!
//! Clients connect over WebSocket, create or join a session by its
//! six-character code, claim seats, and play rounds of auction, play and
//! scoring. The server is authoritative: every rule runs in
//! [`bridgetable_game`] and every session is owned by one actor task in
//! [`bridgetable_session`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bridgetable::prelude::*;
//!
//! # async fn run() -> Result<(), BridgeError> {
//! let server = BridgeServer::builder()
//!     .bind("0.0.0.0:8000")
//!     .history_dir("game_history")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;
mod telemetry;

pub use error::BridgeError;
pub use server::{BridgeServer, BridgeServerBuilder};
pub use telemetry::init_tracing;

pub mod prelude {
    pub use crate::{BridgeError, BridgeServer, BridgeServerBuilder};
    pub use bridgetable_game::{GameError, ServerEvent};
    pub use bridgetable_protocol::{ClientCommand, PlayerId, Seat, SessionId};
    pub use bridgetable_session::{
        HistorySink, JsonFileSink, MemorySink, NullSink, ReaperConfig, SinkError,
    };
}
