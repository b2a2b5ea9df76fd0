//! Who is at the table and where they sit.
//!
//! [`Seating`] owns the join-ordered player list, the host, and the seat
//! map. The seat map is kept in both directions (seat to player and
//! player to seat) and only [`Seating`]'s methods mutate it, so the two
//! views never disagree.

use std::collections::HashMap;

use bridgetable_protocol::{PlayerId, Seat};

/// Players a session holds.
pub const MAX_PLAYERS: usize = 4;

/// Display labels handed out by join position.
pub const PLAYER_LABELS: [&str; MAX_PLAYERS] = ["alpha", "beta", "sigma", "zeta"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seating {
    players: Vec<PlayerId>,
    host: Option<PlayerId>,
    seats: [Option<PlayerId>; 4],
    by_player: HashMap<PlayerId, Seat>,
}

impl Seating {
    /// A table holding only its host.
    pub fn new(host: PlayerId) -> Self {
        Self {
            players: vec![host],
            host: Some(host),
            seats: [None; 4],
            by_player: HashMap::new(),
        }
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.host
    }

    pub fn is_host(&self, player: PlayerId) -> bool {
        self.host == Some(player)
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Join position of `player`.
    pub fn index_of(&self, player: PlayerId) -> Option<usize> {
        self.players.iter().position(|&p| p == player)
    }

    /// Label of `player` by join position.
    pub fn label(&self, player: PlayerId) -> Option<&'static str> {
        self.index_of(player).and_then(|i| PLAYER_LABELS.get(i).copied())
    }

    pub fn occupant(&self, seat: Seat) -> Option<PlayerId> {
        self.seats[seat.index()]
    }

    pub fn seat_of(&self, player: PlayerId) -> Option<Seat> {
        self.by_player.get(&player).copied()
    }

    pub fn all_seated(&self) -> bool {
        self.seats.iter().all(Option::is_some)
    }

    /// Appends `player` in join order. Returns `false` if already present
    /// or the table is full.
    pub fn add(&mut self, player: PlayerId) -> bool {
        if self.contains(player) || self.is_full() {
            return false;
        }
        self.players.push(player);
        true
    }

    /// Removes `player`, vacating their seat. If they were host, the
    /// earliest remaining joiner becomes host.
    pub fn remove(&mut self, player: PlayerId) -> bool {
        let Some(pos) = self.index_of(player) else {
            return false;
        };
        self.players.remove(pos);
        self.vacate(player);
        if self.host == Some(player) {
            self.host = self.players.first().copied();
        }
        true
    }

    /// Seats `player` at `seat`. Any seat the player held is vacated
    /// first, and a different occupant of `seat` is unseated.
    ///
    /// Returns the displaced occupant, if any.
    pub fn claim(&mut self, player: PlayerId, seat: Seat) -> Option<PlayerId> {
        self.vacate(player);
        let displaced = self.seats[seat.index()].replace(player);
        if let Some(other) = displaced {
            self.by_player.remove(&other);
        }
        self.by_player.insert(player, seat);
        displaced
    }

    fn vacate(&mut self, player: PlayerId) {
        if let Some(seat) = self.by_player.remove(&player) {
            self.seats[seat.index()] = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);
    const C: PlayerId = PlayerId(3);
    const D: PlayerId = PlayerId(4);

    fn consistent(s: &Seating) -> bool {
        Seat::ALL.iter().all(|&seat| match s.occupant(seat) {
            Some(p) => s.seat_of(p) == Some(seat),
            None => true,
        }) && s
            .players()
            .iter()
            .all(|&p| s.seat_of(p).is_none_or(|seat| s.occupant(seat) == Some(p)))
    }

    #[test]
    fn test_new_creator_is_host_and_sole_player() {
        let s = Seating::new(A);
        assert_eq!(s.players(), &[A]);
        assert!(s.is_host(A));
        assert_eq!(s.label(A), Some("alpha"));
    }

    #[test]
    fn test_add_rejects_fifth_player_and_duplicates() {
        let mut s = Seating::new(A);
        assert!(s.add(B));
        assert!(!s.add(B));
        assert!(s.add(C));
        assert!(s.add(D));
        assert!(s.is_full());
        assert!(!s.add(PlayerId(5)));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_claim_moves_player_between_seats() {
        let mut s = Seating::new(A);
        s.claim(A, Seat::North);
        s.claim(A, Seat::East);
        assert_eq!(s.occupant(Seat::North), None);
        assert_eq!(s.occupant(Seat::East), Some(A));
        assert_eq!(s.seat_of(A), Some(Seat::East));
        assert!(consistent(&s));
    }

    #[test]
    fn test_claim_unseats_previous_occupant() {
        let mut s = Seating::new(A);
        s.add(B);
        s.claim(A, Seat::North);
        let displaced = s.claim(B, Seat::North);
        assert_eq!(displaced, Some(A));
        assert_eq!(s.seat_of(A), None);
        assert_eq!(s.occupant(Seat::North), Some(B));
        assert!(consistent(&s));
    }

    #[test]
    fn test_claim_same_seat_twice_is_stable() {
        let mut s = Seating::new(A);
        s.claim(A, Seat::South);
        assert_eq!(s.claim(A, Seat::South), None);
        assert_eq!(s.occupant(Seat::South), Some(A));
    }

    #[test]
    fn test_remove_vacates_seat_and_hands_over_host() {
        let mut s = Seating::new(A);
        s.add(B);
        s.add(C);
        s.claim(A, Seat::West);
        assert!(s.remove(A));
        assert_eq!(s.occupant(Seat::West), None);
        assert_eq!(s.host(), Some(B));
        assert_eq!(s.label(B), Some("alpha"));
        assert!(!s.remove(A));
    }

    #[test]
    fn test_remove_last_player_leaves_no_host() {
        let mut s = Seating::new(A);
        s.remove(A);
        assert!(s.is_empty());
        assert_eq!(s.host(), None);
    }

    #[test]
    fn test_all_seated() {
        let mut s = Seating::new(A);
        for p in [B, C, D] {
            s.add(p);
        }
        for (p, seat) in [A, B, C].into_iter().zip(Seat::ALL) {
            s.claim(p, seat);
        }
        assert!(!s.all_seated());
        s.claim(D, Seat::South);
        assert!(s.all_seated());
    }
}
