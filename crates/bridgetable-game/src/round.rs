//! Round rotation and the record kept for each finished round.

use bridgetable_protocol::{Partnership, Seat};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Bid, Contract, PlayRecord, ScoreReport};

/// Which partnerships are vulnerable in a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub ns: bool,
    pub ew: bool,
}

impl Vulnerability {
    /// Vulnerability of a 1-based round: none, NS, EW, both, repeating.
    pub fn for_round(round: u32) -> Self {
        match round.saturating_sub(1) % 4 {
            0 => Self { ns: false, ew: false },
            1 => Self { ns: true, ew: false },
            2 => Self { ns: false, ew: true },
            _ => Self { ns: true, ew: true },
        }
    }

    pub fn is_vulnerable(self, partnership: Partnership) -> bool {
        match partnership {
            Partnership::NorthSouth => self.ns,
            Partnership::EastWest => self.ew,
        }
    }
}

/// Dealer of a 1-based round; the deal moves one seat left each round.
pub fn dealer(round: u32) -> Seat {
    Seat::ALL[(round.saturating_sub(1) % 4) as usize]
}

/// The seat that makes the first call of a round.
pub fn opening_bidder(round: u32) -> Seat {
    dealer(round).next()
}

/// Immutable snapshot of one finished or passed-out round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundHistoryRecord {
    pub game_number: u32,
    pub timestamp: DateTime<Utc>,
    pub vulnerability: Vulnerability,
    pub bidding_history: Vec<Bid>,
    pub contract: Option<Contract>,
    pub play_history: Vec<PlayRecord>,
    pub tricks_won: [u8; 4],
    pub score: ScoreReport,
    pub declarer: Option<Seat>,
    pub dummy: Option<Seat>,
    pub passed_out: bool,
}
