//! Rules engine for a four-player contract bridge table.
//!
//! The engine is synchronous and owns no I/O. Every operation on a
//! [`Game`] either fails with a [`GameError`] and changes nothing, or
//! mutates the game and returns the events to deliver as
//! `(Recipient, ServerEvent)` pairs.
//!
//! # Key types
//!
//! - [`Game`]: one session's table, auction, play and round history
//! - [`Seating`]: players, host and the two-way seat map
//! - [`Bid`], [`Contract`]: the auction and its result
//! - [`PlayedCard`], [`trick_winner`]: card play
//! - [`score`], [`ScoreReport`]: duplicate scoring
//! - [`Vulnerability`], [`RoundHistoryRecord`]: round rotation and records
//! - [`ServerEvent`]: everything a client is told

mod bidding;
mod deck;
mod error;
mod event;
mod game;
mod play;
mod round;
mod scoring;
mod seating;

pub use bidding::{Bid, Contract, DoubleStatus, auction_finished, final_contract};
pub use deck::{Deck, HAND_SIZE, Hand};
pub use error::GameError;
pub use event::{GameStateView, Outbound, ServerEvent};
pub use game::{Game, Phase};
pub use play::{PlayRecord, PlayedCard, TRICKS_PER_ROUND, trick_winner};
pub use round::{RoundHistoryRecord, Vulnerability, dealer, opening_bidder};
pub use scoring::{ScoreBreakdown, ScoreReport, score};
pub use seating::{MAX_PLAYERS, PLAYER_LABELS, Seating};
