//! The 52-card deck and the hands dealt from it.

use bridgetable_protocol::{Card, Seat};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Cards per hand.
pub const HAND_SIZE: usize = 13;

/// A full deck of card ids `1..=52` in dealing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck(Vec<u8>);

impl Deck {
    /// Ids in ascending order: dealing gives north every spade, east
    /// every heart, south every diamond and west every club.
    pub fn ordered() -> Self {
        Self((1..=52).collect())
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.0.shuffle(rng);
        deck
    }

    /// Uses `ids` as the dealing order. Returns `None` unless `ids` is a
    /// permutation of `1..=52`.
    pub fn from_ids(ids: Vec<u8>) -> Option<Self> {
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.into_iter().eq(1..=52).then_some(Self(ids))
    }

    /// Splits the deck into four hands of 13, indexed by [`Seat::index`].
    ///
    /// North takes the first block, then east, south and west.
    pub fn deal(self) -> [Hand; 4] {
        let block = |seat: Seat| {
            let start = match seat {
                Seat::North => 0,
                Seat::East => 1,
                Seat::South => 2,
                Seat::West => 3,
            } * HAND_SIZE;
            Hand::new(self.0[start..start + HAND_SIZE].to_vec())
        };
        Seat::ALL.map(block)
    }
}

/// The card ids a seat holds, kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hand(Vec<u8>);

impl Hand {
    pub fn new(mut ids: Vec<u8>) -> Self {
        ids.sort_unstable();
        Self(ids)
    }

    pub fn ids(&self) -> &[u8] {
        &self.0
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.0.iter().filter_map(|&id| Card::from_id(id))
    }

    pub fn contains(&self, card: Card) -> bool {
        self.0.binary_search(&card.id()).is_ok()
    }

    /// Removes `card` if held. Returns whether it was.
    pub fn remove(&mut self, card: Card) -> bool {
        match self.0.binary_search(&card.id()) {
            Ok(pos) => {
                self.0.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
