//! Card play records and trick resolution.

use bridgetable_protocol::{Card, Rank, Seat, Suit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cards in a complete trick.
pub const TRICK_SIZE: usize = 4;

/// Tricks in a round.
pub const TRICKS_PER_ROUND: u8 = 13;

/// A card on the table, tagged with the seat whose hand it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedCard {
    pub suit: Suit,
    pub rank: Rank,
    #[serde(rename = "player")]
    pub seat: Seat,
}

impl PlayedCard {
    pub fn new(card: Card, seat: Seat) -> Self {
        Self {
            suit: card.suit,
            rank: card.rank,
            seat,
        }
    }

    pub fn card(&self) -> Card {
        Card::new(self.suit, self.rank)
    }
}

/// One line of a round's play log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRecord {
    /// 1-based trick number within the round.
    pub trick_number: u8,
    /// 1-based position within the trick.
    pub card_in_trick: u8,
    pub suit: Suit,
    pub rank: Rank,
    pub player: Seat,
    pub timestamp: DateTime<Utc>,
}

/// Resolves a trick to the seat that won it.
///
/// The lead is the first candidate; each later card replaces the
/// candidate if it is a trump and the candidate is not (or is a lower
/// trump), or if it follows the led suit while no trump has been played
/// and outranks a led-suit candidate. Discards never win.
///
/// Returns `None` for an empty trick.
pub fn trick_winner(trick: &[PlayedCard], trump: Option<Suit>) -> Option<Seat> {
    let lead = trick.first()?;
    let is_trump = |c: &PlayedCard| Some(c.suit) == trump;

    let mut winner = lead;
    for played in &trick[1..] {
        if is_trump(played) {
            if !is_trump(winner) || played.rank > winner.rank {
                winner = played;
            }
        } else if played.suit == lead.suit
            && !is_trump(winner)
            && (winner.suit != lead.suit || played.rank > winner.rank)
        {
            winner = played;
        }
    }
    Some(winner.seat)
}
