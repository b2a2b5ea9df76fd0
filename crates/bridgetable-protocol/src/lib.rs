//! Wire protocol for bridgetable.
//!
//! This crate defines the vocabulary shared by the transport-facing
//! dispatcher and the game engine:
//!
//! - **Identity** ([`PlayerId`], [`SessionId`], [`Recipient`]): who a
//!   message is from and who it goes to.
//! - **Cards** ([`Seat`], [`Suit`], [`Rank`], [`Card`], [`Strain`],
//!   [`Denomination`]): the table positions and the deck, including the
//!   canonical 1–52 card id used for hands and dealing.
//! - **Commands** ([`ClientCommand`]): the closed set of requests a
//!   connection can make, decoded from either JSON or the colon-delimited
//!   text form.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events and
//!   commands are converted to and from text frames.
//!
//! ```text
//! Transport (text frames) → Protocol (ClientCommand) → Game engine
//! ```

mod cards;
mod codec;
mod command;
mod error;
mod types;

pub use cards::{Card, Denomination, Partnership, Rank, Seat, Strain, Suit};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use command::ClientCommand;
pub use error::ProtocolError;
pub use types::{PlayerId, Recipient, SessionId};
