//! The auction: recorded bids, when bidding stops, and the resulting
//! contract.
//!
//! Only turn order is enforced when a bid is accepted. A real bid is not
//! required to outrank the previous one, so an auction such as `2♠ 1♣`
//! is recorded as given and the contract follows the *last* real bid.

use bridgetable_protocol::{Denomination, Partnership, Seat, Strain};
use serde::{Deserialize, Serialize};

/// One entry in the auction, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Label of the player who made the bid.
    pub player: String,
    #[serde(rename = "playerIndex")]
    pub seat: Seat,
    /// 0 for Pass/Double/Redouble, 1–7 for a real bid.
    pub level: u8,
    #[serde(rename = "suit")]
    pub denomination: Denomination,
    /// Text the bidding box showed, e.g. `"3NT"` or `"X"`.
    pub display: String,
}

impl Bid {
    pub fn is_real(&self) -> bool {
        self.level > 0
    }

    pub fn is_pass(&self) -> bool {
        self.denomination == Denomination::Pass
    }
}

/// Doubling state of a contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DoubleStatus {
    #[default]
    Undoubled,
    Doubled,
    Redoubled,
}

/// The final contract of an auction.
///
/// On the wire it keeps the client's shape:
/// `{"level":4,"suit":"spades","declarer":1,"doubled":false,"redoubled":false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ContractRecord", try_from = "ContractRecord")]
pub struct Contract {
    pub level: u8,
    pub strain: Strain,
    pub declarer: Seat,
    pub doubling: DoubleStatus,
}

impl Contract {
    /// Declarer's partner, whose hand is played by declarer.
    pub fn dummy(&self) -> Seat {
        self.declarer.partner()
    }

    pub fn partnership(&self) -> Partnership {
        self.declarer.partnership()
    }

    /// Tricks declarer's side must take: book (6) plus the level.
    pub fn tricks_needed(&self) -> u8 {
        6 + self.level
    }
}

#[derive(Serialize, Deserialize)]
struct ContractRecord {
    level: u8,
    suit: Strain,
    declarer: Seat,
    doubled: bool,
    redoubled: bool,
}

impl From<Contract> for ContractRecord {
    fn from(c: Contract) -> Self {
        Self {
            level: c.level,
            suit: c.strain,
            declarer: c.declarer,
            doubled: c.doubling == DoubleStatus::Doubled,
            redoubled: c.doubling == DoubleStatus::Redoubled,
        }
    }
}

impl TryFrom<ContractRecord> for Contract {
    type Error = String;

    fn try_from(r: ContractRecord) -> Result<Self, Self::Error> {
        let doubling = match (r.doubled, r.redoubled) {
            (false, false) => DoubleStatus::Undoubled,
            (true, false) => DoubleStatus::Doubled,
            (false, true) => DoubleStatus::Redoubled,
            (true, true) => return Err("contract cannot be both doubled and redoubled".into()),
        };
        Ok(Contract {
            level: r.level,
            strain: r.suit,
            declarer: r.declarer,
            doubling,
        })
    }
}

/// Whether the auction is over.
///
/// Four opening passes end it. Otherwise it ends once a real bid has been
/// made and the last three entries are passes. A redouble in the auction
/// does not change the rule.
pub fn auction_finished(bids: &[Bid]) -> bool {
    if bids.len() < 4 {
        return false;
    }
    if bids.len() == 4 && bids.iter().all(Bid::is_pass) {
        return true;
    }
    let has_real_bid = bids.iter().any(Bid::is_real);
    has_real_bid && bids[bids.len() - 3..].iter().all(Bid::is_pass)
}

/// Derives the contract from a finished auction. `None` means the hand
/// was passed out.
///
/// The last real bid fixes level and strain. Declarer is the first player
/// of that partnership to have bid the strain. A redouble after the last
/// real bid takes precedence over a double.
pub fn final_contract(bids: &[Bid]) -> Option<Contract> {
    let (last_pos, last) = bids.iter().enumerate().rev().find(|(_, b)| b.is_real())?;
    let strain = last.denomination.strain()?;
    let partnership = last.seat.partnership();

    let declarer = bids
        .iter()
        .find(|b| {
            b.is_real() && b.denomination == last.denomination && b.seat.partnership() == partnership
        })
        .map_or(last.seat, |b| b.seat);

    let after = &bids[last_pos + 1..];
    let doubling = if after.iter().any(|b| b.denomination == Denomination::Redouble) {
        DoubleStatus::Redoubled
    } else if after.iter().any(|b| b.denomination == Denomination::Double) {
        DoubleStatus::Doubled
    } else {
        DoubleStatus::Undoubled
    };

    Some(Contract {
        level: last.level,
        strain,
        declarer,
        doubling,
    })
}
