//! Table positions, the deck, and auction denominations.
//!
//! Seats are numbered the way the table is drawn on the client:
//! `0 = west, 1 = north, 2 = east, 3 = south`. "Next" is the seat to the
//! left (clockwise), and partners sit two apart, so the partnerships are
//! west-east (even seats) and north-south (odd seats).
//!
//! A card's canonical id is suit-major over `spades, hearts, diamonds,
//! clubs` with rank `0 = two .. 12 = ace`: `id = suit * 13 + rank + 1`,
//! giving ids in `1..=52`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Seat / Partnership
// ---------------------------------------------------------------------------

/// One of the four fixed table positions.
///
/// Serialized as its index (`0..=3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Seat {
    West = 0,
    North = 1,
    East = 2,
    South = 3,
}

impl Seat {
    /// All seats in index order.
    pub const ALL: [Seat; 4] = [Seat::West, Seat::North, Seat::East, Seat::South];

    /// The positional index, `0..=3`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Seat> {
        Self::ALL.get(index).copied()
    }

    /// The seat to this seat's left: the next to act.
    pub fn next(self) -> Seat {
        Self::ALL[(self.index() + 1) % 4]
    }

    pub fn partner(self) -> Seat {
        Self::ALL[(self.index() + 2) % 4]
    }

    pub fn partnership(self) -> Partnership {
        if self.index() % 2 == 0 {
            Partnership::EastWest
        } else {
            Partnership::NorthSouth
        }
    }

    /// Lowercase name as used by the seat-claim command.
    pub fn name(self) -> &'static str {
        match self {
            Seat::West => "west",
            Seat::North => "north",
            Seat::East => "east",
            Seat::South => "south",
        }
    }
}

impl From<Seat> for u8 {
    fn from(seat: Seat) -> u8 {
        seat as u8
    }
}

impl TryFrom<u8> for Seat {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Seat::from_index(value as usize).ok_or_else(|| {
            ProtocolError::BadCommand(format!("seat index {value} out of range 0-3"))
        })
    }
}

impl FromStr for Seat {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Seat::ALL
            .into_iter()
            .find(|seat| seat.name() == s)
            .ok_or_else(|| ProtocolError::BadCommand(format!("unknown seat {s:?}")))
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pair of partners sharing a score.
///
/// Serialized as `0` (west-east) or `1` (north-south), matching
/// `seat index % 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Partnership {
    EastWest = 0,
    NorthSouth = 1,
}

impl Partnership {
    pub fn seats(self) -> [Seat; 2] {
        match self {
            Partnership::EastWest => [Seat::West, Seat::East],
            Partnership::NorthSouth => [Seat::North, Seat::South],
        }
    }

    pub fn opponents(self) -> Partnership {
        match self {
            Partnership::EastWest => Partnership::NorthSouth,
            Partnership::NorthSouth => Partnership::EastWest,
        }
    }
}

impl From<Partnership> for u8 {
    fn from(p: Partnership) -> u8 {
        p as u8
    }
}

impl TryFrom<u8> for Partnership {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Partnership::EastWest),
            1 => Ok(Partnership::NorthSouth),
            _ => Err(ProtocolError::BadCommand(format!(
                "partnership {value} out of range 0-1"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Suit / Rank / Card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    /// Suit-major order used by card ids.
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Spades => "spades",
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }
}

impl FromStr for Suit {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Suit::ALL
            .into_iter()
            .find(|suit| suit.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProtocolError::BadCommand(format!("unknown suit {s:?}")))
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Card rank, `0` (two) through `12` (ace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct Rank(u8);

impl Rank {
    pub const TWO: Rank = Rank(0);
    pub const TEN: Rank = Rank(8);
    pub const JACK: Rank = Rank(9);
    pub const QUEEN: Rank = Rank(10);
    pub const KING: Rank = Rank(11);
    pub const ACE: Rank = Rank(12);

    pub fn new(value: u8) -> Option<Rank> {
        (value <= 12).then_some(Rank(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank.0
    }
}

impl TryFrom<u8> for Rank {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::new(value)
            .ok_or_else(|| ProtocolError::BadCommand(format!("rank {value} out of range 0-12")))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0..=8 => write!(f, "{}", self.0 + 2),
            9 => f.write_str("J"),
            10 => f.write_str("Q"),
            11 => f.write_str("K"),
            _ => f.write_str("A"),
        }
    }
}

/// A playing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Canonical id in `1..=52`.
    pub fn id(self) -> u8 {
        self.suit.index() * 13 + self.rank.value() + 1
    }

    pub fn from_id(id: u8) -> Option<Card> {
        if !(1..=52).contains(&id) {
            return None;
        }
        let zero_based = id - 1;
        let suit = Suit::ALL[(zero_based / 13) as usize];
        Some(Card::new(suit, Rank(zero_based % 13)))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit.symbol(), self.rank)
    }
}

// ---------------------------------------------------------------------------
// Strain / Denomination
// ---------------------------------------------------------------------------

/// The denomination of a real bid or a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strain {
    #[serde(rename = "clubs")]
    Clubs,
    #[serde(rename = "diamonds")]
    Diamonds,
    #[serde(rename = "hearts")]
    Hearts,
    #[serde(rename = "spades")]
    Spades,
    #[serde(rename = "NT")]
    NoTrump,
}

impl Strain {
    /// The trump suit played under this strain; `None` for no-trump.
    pub fn trump(self) -> Option<Suit> {
        match self {
            Strain::Clubs => Some(Suit::Clubs),
            Strain::Diamonds => Some(Suit::Diamonds),
            Strain::Hearts => Some(Suit::Hearts),
            Strain::Spades => Some(Suit::Spades),
            Strain::NoTrump => None,
        }
    }

    pub fn is_minor(self) -> bool {
        matches!(self, Strain::Clubs | Strain::Diamonds)
    }

    pub fn is_major(self) -> bool {
        matches!(self, Strain::Hearts | Strain::Spades)
    }
}

impl fmt::Display for Strain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strain::NoTrump => f.write_str("NT"),
            other => match other.trump() {
                Some(suit) => write!(f, "{}", suit.symbol()),
                None => Ok(()),
            },
        }
    }
}

/// What a single auction entry names: a strain for real bids (level
/// 1–7), or one of the level-0 markers Pass, Double and Redouble.
///
/// The wire strings match the client's bidding box: `"clubs"`,
/// `"diamonds"`, `"hearts"`, `"spades"`, `"NT"`, `"Pass"`, `"Double"`,
/// `"Redouble"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Denomination {
    #[serde(rename = "clubs")]
    Clubs,
    #[serde(rename = "diamonds")]
    Diamonds,
    #[serde(rename = "hearts")]
    Hearts,
    #[serde(rename = "spades")]
    Spades,
    #[serde(rename = "NT")]
    NoTrump,
    Pass,
    Double,
    Redouble,
}

impl Denomination {
    const ALL: [Denomination; 8] = [
        Denomination::Clubs,
        Denomination::Diamonds,
        Denomination::Hearts,
        Denomination::Spades,
        Denomination::NoTrump,
        Denomination::Pass,
        Denomination::Double,
        Denomination::Redouble,
    ];

    /// The strain named by a real bid, `None` for the markers.
    pub fn strain(self) -> Option<Strain> {
        match self {
            Denomination::Clubs => Some(Strain::Clubs),
            Denomination::Diamonds => Some(Strain::Diamonds),
            Denomination::Hearts => Some(Strain::Hearts),
            Denomination::Spades => Some(Strain::Spades),
            Denomination::NoTrump => Some(Strain::NoTrump),
            Denomination::Pass | Denomination::Double | Denomination::Redouble => None,
        }
    }

    pub fn is_marker(self) -> bool {
        self.strain().is_none()
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Denomination::Clubs => "clubs",
            Denomination::Diamonds => "diamonds",
            Denomination::Hearts => "hearts",
            Denomination::Spades => "spades",
            Denomination::NoTrump => "NT",
            Denomination::Pass => "Pass",
            Denomination::Double => "Double",
            Denomination::Redouble => "Redouble",
        }
    }
}

impl From<Strain> for Denomination {
    fn from(strain: Strain) -> Self {
        match strain {
            Strain::Clubs => Denomination::Clubs,
            Strain::Diamonds => Denomination::Diamonds,
            Strain::Hearts => Denomination::Hearts,
            Strain::Spades => Denomination::Spades,
            Strain::NoTrump => Denomination::NoTrump,
        }
    }
}

impl FromStr for Denomination {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Denomination::ALL
            .into_iter()
            .find(|d| d.wire_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProtocolError::BadCommand(format!("unknown denomination {s:?}")))
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
