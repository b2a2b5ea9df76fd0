//! One four-seat session and its state machine.
//!
//! ```text
//!            start_round            auction ends
//!   Lobby ───────────────▶ Bidding ─────────────▶ Playing
//!     ▲                       │ passed out           │ 13th trick
//!     └───────────────────────┴──────────────────────┘
//! ```
//!
//! Every operation validates before it mutates: a rejected request
//! returns a [`GameError`] and leaves the game exactly as it was.

use std::fmt;

use bridgetable_protocol::{Card, Denomination, PlayerId, Recipient, Seat, SessionId, Suit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bidding::{auction_finished, final_contract};
use crate::play::{TRICK_SIZE, TRICKS_PER_ROUND, trick_winner};
use crate::round::opening_bidder;
use crate::{
    Bid, Contract, Deck, GameError, GameStateView, Hand, Outbound, PlayRecord, PlayedCard,
    RoundHistoryRecord, ScoreReport, Seating, ServerEvent, Vulnerability, score,
};

const GAME_STARTED_MESSAGE: &str = "Game started and cards dealt!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Lobby,
    Bidding,
    Playing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Lobby => "lobby",
            Phase::Bidding => "bidding",
            Phase::Playing => "playing",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    session_id: SessionId,
    seating: Seating,
    hands: [Hand; 4],
    auction: Vec<Bid>,
    turn: Seat,
    phase: Phase,
    trick: Vec<PlayedCard>,
    tricks_won: [u8; 4],
    contract: Option<Contract>,
    dummy_revealed: bool,
    round: u32,
    play_history: Vec<PlayRecord>,
    history: Vec<RoundHistoryRecord>,
    last_updated: DateTime<Utc>,
}

impl Game {
    /// A new session with `host` as its only player, in the lobby.
    pub fn new(session_id: SessionId, host: PlayerId) -> Self {
        Self {
            session_id,
            seating: Seating::new(host),
            hands: Default::default(),
            auction: Vec::new(),
            turn: opening_bidder(1),
            phase: Phase::Lobby,
            trick: Vec::new(),
            tricks_won: [0; 4],
            contract: None,
            dummy_revealed: false,
            round: 1,
            play_history: Vec::new(),
            history: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Creates a session and the events announcing it: the code to the
    /// host, then the table state.
    pub fn create(session_id: SessionId, host: PlayerId) -> (Self, Outbound) {
        let game = Self::new(session_id.clone(), host);
        let mut out = vec![(
            Recipient::Player(host),
            ServerEvent::GameCode { code: session_id },
        )];
        out.extend(game.state_views());
        (game, out)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn seating(&self) -> &Seating {
        &self.seating
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The seat expected to act next.
    pub fn turn(&self) -> Seat {
        self.turn
    }

    /// 1-based number of the current (or next) round.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn auction(&self) -> &[Bid] {
        &self.auction
    }

    pub fn contract(&self) -> Option<&Contract> {
        self.contract.as_ref()
    }

    /// Trump suit of the active contract; `None` at no-trump or with no
    /// contract.
    pub fn trump(&self) -> Option<Suit> {
        self.contract.and_then(|c| c.strain.trump())
    }

    pub fn current_trick(&self) -> &[PlayedCard] {
        &self.trick
    }

    pub fn tricks_won(&self) -> [u8; 4] {
        self.tricks_won
    }

    pub fn dummy_revealed(&self) -> bool {
        self.dummy_revealed
    }

    pub fn play_history(&self) -> &[PlayRecord] {
        &self.play_history
    }

    /// Completed rounds, oldest first.
    pub fn history(&self) -> &[RoundHistoryRecord] {
        &self.history
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn vulnerability(&self) -> Vulnerability {
        Vulnerability::for_round(self.round)
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    fn tricks_played(&self) -> u8 {
        self.tricks_won.iter().sum()
    }

    fn require_member(&self, player: PlayerId) -> Result<(), GameError> {
        if self.seating.contains(player) {
            Ok(())
        } else {
            Err(GameError::NotInSession)
        }
    }

    fn require_phase(&self, expected: Phase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    // ---------------------------------------------------------------------
    // Seating
    // ---------------------------------------------------------------------

    /// The table as `player` sees it.
    pub fn state_view_for(&self, player: PlayerId) -> Option<GameStateView> {
        let your_index = self.seating.index_of(player)?;
        let label_at = |seat: Seat| {
            self.seating
                .occupant(seat)
                .and_then(|p| self.seating.label(p))
                .map(str::to_owned)
        };
        Some(GameStateView {
            game_id: self.session_id.clone(),
            last_updated: self.last_updated,
            players: self
                .seating
                .players()
                .iter()
                .filter_map(|&p| self.seating.label(p).map(str::to_owned))
                .collect(),
            north: label_at(Seat::North),
            south: label_at(Seat::South),
            east: label_at(Seat::East),
            west: label_at(Seat::West),
            your_name: self.seating.label(player).unwrap_or_default().to_owned(),
            your_index,
            is_host: self.seating.is_host(player),
        })
    }

    /// A personalised state view for every player.
    pub fn state_views(&self) -> Outbound {
        self.seating
            .players()
            .iter()
            .filter_map(|&p| {
                self.state_view_for(p)
                    .map(|view| (Recipient::Player(p), ServerEvent::GameState(view)))
            })
            .collect()
    }

    /// Adds `player`. Joining a session one already belongs to just
    /// re-sends the state.
    pub fn join(&mut self, player: PlayerId) -> Result<Outbound, GameError> {
        if self.seating.contains(player) {
            return Ok(self.state_views());
        }
        if !self.seating.add(player) {
            return Err(GameError::SessionFull(self.session_id.clone()));
        }
        self.touch();
        tracing::info!(
            session_id = %self.session_id,
            %player,
            players = self.seating.len(),
            "player joined"
        );
        Ok(self.state_views())
    }

    /// Removes `player` and vacates their seat. Returns the refreshed
    /// state for whoever remains.
    pub fn leave(&mut self, player: PlayerId) -> Outbound {
        if !self.seating.remove(player) {
            return Vec::new();
        }
        self.touch();
        tracing::info!(
            session_id = %self.session_id,
            %player,
            players = self.seating.len(),
            "player left"
        );
        self.state_views()
    }

    pub fn claim_seat(&mut self, player: PlayerId, seat_name: &str) -> Result<Outbound, GameError> {
        self.require_member(player)?;
        let seat: Seat = seat_name
            .parse()
            .map_err(|_| GameError::InvalidSeat(seat_name.to_owned()))?;

        let displaced = self.seating.claim(player, seat);
        self.touch();
        tracing::debug!(
            session_id = %self.session_id,
            %player,
            seat = %seat,
            displaced = ?displaced,
            "seat claimed"
        );
        Ok(self.state_views())
    }

    // ---------------------------------------------------------------------
    // Round lifecycle
    // ---------------------------------------------------------------------

    /// Deals `deck` and opens the auction. Host only, all four seats
    /// filled. Allowed in any phase; a deal in progress is abandoned.
    pub fn start_round(&mut self, requester: PlayerId, deck: Deck) -> Result<Outbound, GameError> {
        self.require_member(requester)?;
        if !self.seating.is_host(requester) {
            return Err(GameError::illegal("Only the host can start the game"));
        }
        if !self.seating.all_seated() {
            return Err(GameError::illegal(
                "All positions must be filled before starting",
            ));
        }

        self.hands = deck.deal();
        self.auction.clear();
        self.contract = None;
        self.dummy_revealed = false;
        self.trick.clear();
        self.tricks_won = [0; 4];
        self.play_history.clear();
        self.phase = Phase::Bidding;
        self.turn = opening_bidder(self.round);
        self.touch();

        tracing::info!(
            session_id = %self.session_id,
            round = self.round,
            first = %self.turn,
            "round started"
        );

        let mut out: Outbound = Seat::ALL
            .iter()
            .filter_map(|&seat| {
                self.seating.occupant(seat).map(|p| {
                    (
                        Recipient::Player(p),
                        ServerEvent::Hand {
                            hand: self.hands[seat.index()].clone(),
                        },
                    )
                })
            })
            .collect();
        out.push((
            Recipient::All,
            ServerEvent::GameStarted {
                message: GAME_STARTED_MESSAGE.to_owned(),
                current_player: self.turn,
                game_number: self.round,
                vulnerability: self.vulnerability(),
            },
        ));
        Ok(out)
    }

    /// Records the round, returns to the lobby and advances the round
    /// number. Emits `game_over`.
    fn finish_round(&mut self) -> Outbound {
        let vulnerability = self.vulnerability();
        let contract = self.contract.take();
        let report = match &contract {
            Some(c) => score(c, self.tricks_won, vulnerability),
            None => ScoreReport::passed_out(),
        };
        let passed_out = contract.is_none();

        self.history.push(RoundHistoryRecord {
            game_number: self.round,
            timestamp: Utc::now(),
            vulnerability,
            bidding_history: self.auction.clone(),
            contract,
            play_history: self.play_history.clone(),
            tricks_won: self.tricks_won,
            score: report,
            declarer: contract.map(|c| c.declarer),
            dummy: contract.map(|c| c.dummy()),
            passed_out,
        });

        tracing::info!(
            session_id = %self.session_id,
            round = self.round,
            passed_out,
            contract_made = report.contract_made,
            declarer_total = report.declarer_score.total,
            defender_total = report.defender_score.total,
            rounds_recorded = self.history.len(),
            "round finished"
        );

        let event = ServerEvent::GameOver {
            tricks: self.tricks_won,
            contract,
            score: report,
            game_number: self.round,
            vulnerability,
            passed_out,
        };

        self.round += 1;
        self.phase = Phase::Lobby;
        self.trick.clear();
        vec![(Recipient::All, event)]
    }

    // ---------------------------------------------------------------------
    // Auction
    // ---------------------------------------------------------------------

    /// Records a call for `seat`. Only phase and turn are checked; bids
    /// need not outrank earlier ones.
    pub fn submit_bid(
        &mut self,
        requester: PlayerId,
        level: u8,
        denomination: Denomination,
        seat: Seat,
        display: String,
    ) -> Result<Outbound, GameError> {
        self.require_member(requester)?;
        self.require_phase(Phase::Bidding)?;
        if seat != self.turn {
            return Err(GameError::NotYourTurn);
        }
        if level > 7 || denomination.is_marker() != (level == 0) {
            return Err(GameError::MalformedRequest(format!(
                "level {level} does not go with {denomination}"
            )));
        }

        let bid = Bid {
            player: self.seating.label(requester).unwrap_or_default().to_owned(),
            seat,
            level,
            denomination,
            display,
        };
        tracing::debug!(
            session_id = %self.session_id,
            seat = %seat,
            level,
            %denomination,
            "bid"
        );
        self.auction.push(bid.clone());
        self.touch();

        let mut out = vec![(Recipient::All, ServerEvent::Bid { bid })];

        if !auction_finished(&self.auction) {
            self.turn = self.turn.next();
            out.push((
                Recipient::All,
                ServerEvent::NextPlayer {
                    current_player: self.turn,
                },
            ));
            return Ok(out);
        }

        match final_contract(&self.auction) {
            Some(contract) => {
                self.contract = Some(contract);
                self.phase = Phase::Playing;
                self.turn = contract.declarer.next();
                tracing::info!(
                    session_id = %self.session_id,
                    level = contract.level,
                    strain = %contract.strain,
                    declarer = %contract.declarer,
                    "auction won"
                );
                out.push((
                    Recipient::All,
                    ServerEvent::BiddingEnded {
                        contract,
                        current_player: self.turn,
                    },
                ));
            }
            None => out.extend(self.finish_round()),
        }
        Ok(out)
    }

    // ---------------------------------------------------------------------
    // Play
    // ---------------------------------------------------------------------

    /// Plays `card` from `seat`'s hand.
    ///
    /// `seat` must be the seat on turn. A player may play only from their
    /// own seat, except that declarer plays for dummy. The card is taken
    /// out of the hand when held; a card the hand does not hold is still
    /// played to the trick. Following suit is not enforced.
    pub fn play_card(
        &mut self,
        requester: PlayerId,
        card: Card,
        seat: Seat,
    ) -> Result<Outbound, GameError> {
        self.require_member(requester)?;
        self.require_phase(Phase::Playing)?;
        if seat != self.turn {
            return Err(GameError::NotYourTurn);
        }
        let requester_seat = self
            .seating
            .seat_of(requester)
            .ok_or_else(|| GameError::illegal("Player position not found"))?;
        let contract = self.contract.ok_or(GameError::Internal)?;
        let dummy = contract.dummy();

        if seat == dummy {
            if requester_seat != contract.declarer {
                return Err(GameError::illegal("Only declarer can play dummy's cards"));
            }
        } else if requester_seat != seat {
            return Err(GameError::illegal("You can only play your own cards"));
        }

        if !self.hands[seat.index()].remove(card) {
            tracing::debug!(
                session_id = %self.session_id,
                seat = %seat,
                %card,
                "played card not in hand"
            );
        }

        self.trick.push(PlayedCard::new(card, seat));
        self.play_history.push(PlayRecord {
            trick_number: self.tricks_played() + 1,
            card_in_trick: self.trick.len() as u8,
            suit: card.suit,
            rank: card.rank,
            player: seat,
            timestamp: Utc::now(),
        });
        self.touch();

        let mut out = vec![(
            Recipient::All,
            ServerEvent::CardPlayed { card, player: seat },
        )];

        if !self.dummy_revealed && self.trick.len() == 1 {
            self.dummy_revealed = true;
            out.push((
                Recipient::All,
                ServerEvent::DummyRevealed {
                    dummy_player: dummy,
                    dummy_hand: self.hands[dummy.index()].clone(),
                },
            ));
        }
        if seat == dummy {
            out.push((
                Recipient::All,
                ServerEvent::DummyHandUpdated {
                    dummy_player: dummy,
                    dummy_hand: self.hands[dummy.index()].clone(),
                },
            ));
        }

        if self.trick.len() < TRICK_SIZE {
            self.turn = self.turn.next();
            out.push((
                Recipient::All,
                ServerEvent::NextPlayer {
                    current_player: self.turn,
                },
            ));
            return Ok(out);
        }

        let winner = trick_winner(&self.trick, self.trump()).ok_or(GameError::Internal)?;
        self.tricks_won[winner.index()] += 1;
        self.trick.clear();
        self.turn = winner;
        out.push((
            Recipient::All,
            ServerEvent::TrickComplete {
                winner,
                tricks: self.tricks_won,
            },
        ));

        if self.tricks_played() >= TRICKS_PER_ROUND {
            out.extend(self.finish_round());
        } else {
            out.push((
                Recipient::All,
                ServerEvent::NextPlayer {
                    current_player: self.turn,
                },
            ));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridgetable_protocol::{Rank, Strain};

    const HOST: PlayerId = PlayerId(1);
    const P2: PlayerId = PlayerId(2);
    const P3: PlayerId = PlayerId(3);
    const P4: PlayerId = PlayerId(4);

    /// HOST west, P2 north, P3 east, P4 south.
    fn seated_game() -> Game {
        let mut game = Game::new(SessionId::new("tbl001"), HOST);
        for p in [P2, P3, P4] {
            game.join(p).unwrap();
        }
        for (p, name) in [(HOST, "west"), (P2, "north"), (P3, "east"), (P4, "south")] {
            game.claim_seat(p, name).unwrap();
        }
        game
    }

    fn player_at(seat: Seat) -> PlayerId {
        match seat {
            Seat::West => HOST,
            Seat::North => P2,
            Seat::East => P3,
            Seat::South => P4,
        }
    }

    fn call(game: &mut Game, level: u8, denomination: Denomination) -> Result<Outbound, GameError> {
        let seat = game.turn();
        game.submit_bid(player_at(seat), level, denomination, seat, denomination.to_string())
    }

    fn pass(game: &mut Game) -> Outbound {
        call(game, 0, Denomination::Pass).unwrap()
    }

    fn kinds(out: &Outbound) -> Vec<&'static str> {
        out.iter().map(|(_, e)| e.kind()).collect()
    }

    /// Round 1 with an ordered deck: North opens 1♠, three passes.
    fn north_declares_one_spade() -> Game {
        let mut game = seated_game();
        game.start_round(HOST, Deck::ordered()).unwrap();
        call(&mut game, 1, Denomination::Spades).unwrap();
        pass(&mut game);
        pass(&mut game);
        pass(&mut game);
        game
    }

    // =====================================================================
    // create / join / claim
    // =====================================================================

    #[test]
    fn test_create_sends_code_then_state() {
        let (game, out) = Game::create(SessionId::new("abc123"), HOST);
        assert_eq!(kinds(&out), ["game_code", "game_state"]);
        assert_eq!(out[0].0, Recipient::Player(HOST));
        assert_eq!(game.phase(), Phase::Lobby);
        assert_eq!(game.round(), 1);
    }

    #[test]
    fn test_join_broadcasts_personal_views() {
        let mut game = Game::new(SessionId::new("abc123"), HOST);
        let out = game.join(P2).unwrap();
        assert_eq!(out.len(), 2);
        let ServerEvent::GameState(view) = &out[1].1 else {
            panic!("expected game_state");
        };
        assert_eq!(out[1].0, Recipient::Player(P2));
        assert_eq!(view.your_name, "beta");
        assert_eq!(view.your_index, 1);
        assert!(!view.is_host);
        assert_eq!(view.players, ["alpha", "beta"]);
    }

    #[test]
    fn test_join_full_session_changes_nothing() {
        let mut game = seated_game();
        game.start_round(HOST, Deck::ordered()).unwrap();
        let seats_before: Vec<_> = Seat::ALL.iter().map(|&s| game.seating().occupant(s)).collect();
        let hands_before: Vec<_> = Seat::ALL.iter().map(|&s| game.hand(s).clone()).collect();

        let err = game.join(PlayerId(5)).unwrap_err();
        assert_eq!(err, GameError::SessionFull(SessionId::new("tbl001")));

        let out = game.state_views();
        assert_eq!(out.len(), 4);
        let seats_after: Vec<_> = Seat::ALL.iter().map(|&s| game.seating().occupant(s)).collect();
        let hands_after: Vec<_> = Seat::ALL.iter().map(|&s| game.hand(s).clone()).collect();
        assert_eq!(seats_before, seats_after);
        assert_eq!(hands_before, hands_after);
    }

    #[test]
    fn test_join_twice_is_a_rebroadcast() {
        let mut game = Game::new(SessionId::new("abc123"), HOST);
        game.join(P2).unwrap();
        let out = game.join(P2).unwrap();
        assert_eq!(game.seating().len(), 2);
        assert_eq!(kinds(&out), ["game_state", "game_state"]);
    }

    #[test]
    fn test_claim_seat_invalid_name() {
        let mut game = Game::new(SessionId::new("abc123"), HOST);
        let err = game.claim_seat(HOST, "northwest").unwrap_err();
        assert_eq!(err, GameError::InvalidSeat("northwest".into()));
    }

    #[test]
    fn test_claim_seat_name_must_match_exactly() {
        let mut game = Game::new(SessionId::new("abc123"), HOST);
        for name in ["North", " north", "north "] {
            let err = game.claim_seat(HOST, name).unwrap_err();
            assert_eq!(err, GameError::InvalidSeat(name.into()));
        }
        assert_eq!(game.seating().seat_of(HOST), None);
    }

    #[test]
    fn test_claim_seat_by_stranger_is_not_in_session() {
        let mut game = Game::new(SessionId::new("abc123"), HOST);
        assert_eq!(game.claim_seat(P2, "north").unwrap_err(), GameError::NotInSession);
    }

    #[test]
    fn test_claim_seat_view_names_occupants() {
        let mut game = Game::new(SessionId::new("abc123"), HOST);
        game.join(P2).unwrap();
        game.claim_seat(P2, "north").unwrap();
        let view = game.state_view_for(HOST).unwrap();
        assert_eq!(view.north.as_deref(), Some("beta"));
        assert_eq!(view.south, None);
        assert!(view.is_host);
    }

    #[test]
    fn test_leave_hands_over_host_and_vacates_seat() {
        let mut game = seated_game();
        let out = game.leave(HOST);
        assert_eq!(out.len(), 3);
        assert_eq!(game.seating().occupant(Seat::West), None);
        assert_eq!(game.seating().host(), Some(P2));
        assert!(game.state_view_for(P2).unwrap().is_host);
    }

    #[test]
    fn test_leave_last_player_emits_nothing() {
        let mut game = Game::new(SessionId::new("abc123"), HOST);
        assert!(game.leave(HOST).is_empty());
        assert!(game.seating().is_empty());
    }

    // =====================================================================
    // start_round
    // =====================================================================

    #[test]
    fn test_start_round_requires_host() {
        let mut game = seated_game();
        let err = game.start_round(P2, Deck::ordered()).unwrap_err();
        assert_eq!(err.to_string(), "Only the host can start the game");
        assert_eq!(game.phase(), Phase::Lobby);
    }

    #[test]
    fn test_start_round_requires_four_seats() {
        let mut game = Game::new(SessionId::new("abc123"), HOST);
        game.claim_seat(HOST, "north").unwrap();
        let err = game.start_round(HOST, Deck::ordered()).unwrap_err();
        assert_eq!(err.to_string(), "All positions must be filled before starting");
    }

    #[test]
    fn test_start_round_deals_privately_then_announces() {
        let mut game = seated_game();
        let out = game.start_round(HOST, Deck::ordered()).unwrap();
        assert_eq!(kinds(&out), ["hand", "hand", "hand", "hand", "game_started"]);
        // Hands go out in seat order: west, north, east, south.
        assert_eq!(out[1].0, Recipient::Player(P2));
        let ServerEvent::Hand { hand } = &out[1].1 else {
            panic!("expected hand");
        };
        assert_eq!(hand.ids(), (1..=13).collect::<Vec<u8>>().as_slice());

        let ServerEvent::GameStarted {
            current_player,
            game_number,
            vulnerability,
            ..
        } = &out[4].1
        else {
            panic!("expected game_started");
        };
        assert_eq!(*current_player, Seat::North);
        assert_eq!(*game_number, 1);
        assert_eq!(*vulnerability, Vulnerability::default());
        assert_eq!(game.phase(), Phase::Bidding);
    }

    #[test]
    fn test_start_round_mid_auction_redeals() {
        let mut game = seated_game();
        game.start_round(HOST, Deck::ordered()).unwrap();
        call(&mut game, 1, Denomination::Clubs).unwrap();
        game.start_round(HOST, Deck::ordered()).unwrap();
        assert!(game.auction().is_empty());
        assert_eq!(game.turn(), Seat::North);
        assert_eq!(game.round(), 1);
    }

    // =====================================================================
    // submit_bid
    // =====================================================================

    #[test]
    fn test_submit_bid_outside_bidding_is_wrong_phase() {
        let mut game = seated_game();
        let err = game
            .submit_bid(P2, 1, Denomination::Clubs, Seat::North, "1♣".into())
            .unwrap_err();
        assert_eq!(
            err,
            GameError::WrongPhase {
                expected: Phase::Bidding,
                actual: Phase::Lobby
            }
        );
    }

    #[test]
    fn test_submit_bid_out_of_turn_changes_nothing() {
        let mut game = seated_game();
        game.start_round(HOST, Deck::ordered()).unwrap();
        let err = game
            .submit_bid(P3, 1, Denomination::Clubs, Seat::East, "1♣".into())
            .unwrap_err();
        assert_eq!(err, GameError::NotYourTurn);
        assert!(game.auction().is_empty());
        assert_eq!(game.turn(), Seat::North);
    }

    #[test]
    fn test_submit_bid_records_label_and_advances_turn() {
        let mut game = seated_game();
        game.start_round(HOST, Deck::ordered()).unwrap();
        let out = call(&mut game, 1, Denomination::NoTrump).unwrap();
        assert_eq!(kinds(&out), ["bid", "next_player"]);
        assert_eq!(game.auction()[0].player, "beta");
        assert_eq!(game.auction()[0].seat, Seat::North);
        assert_eq!(game.turn(), Seat::East);
    }

    #[test]
    fn test_submit_bid_rejects_level_mismatch() {
        let mut game = seated_game();
        game.start_round(HOST, Deck::ordered()).unwrap();
        let err = call(&mut game, 2, Denomination::Pass).unwrap_err();
        assert!(matches!(err, GameError::MalformedRequest(_)));
    }

    #[test]
    fn test_submit_bid_passed_out_round() {
        let mut game = seated_game();
        game.start_round(HOST, Deck::ordered()).unwrap();
        pass(&mut game);
        pass(&mut game);
        pass(&mut game);
        let out = pass(&mut game);
        assert_eq!(kinds(&out), ["bid", "game_over"]);
        let ServerEvent::GameOver {
            score,
            passed_out,
            contract,
            tricks,
            ..
        } = &out[1].1
        else {
            panic!("expected game_over");
        };
        assert!(*passed_out);
        assert!(contract.is_none());
        assert_eq!(*tricks, [0; 4]);
        assert_eq!(*score, ScoreReport::passed_out());

        assert_eq!(game.phase(), Phase::Lobby);
        assert_eq!(game.round(), 2);
        let record = &game.history()[0];
        assert!(record.passed_out);
        assert_eq!(record.bidding_history.len(), 4);
        assert!(record.play_history.is_empty());
        assert_eq!(record.declarer, None);
    }

    #[test]
    fn test_submit_bid_auction_end_opens_play() {
        let game = north_declares_one_spade();
        assert_eq!(game.phase(), Phase::Playing);
        let contract = game.contract().unwrap();
        assert_eq!(contract.declarer, Seat::North);
        assert_eq!(contract.strain, Strain::Spades);
        assert_eq!(game.trump(), Some(Suit::Spades));
        assert_eq!(game.turn(), Seat::East);
    }

    #[test]
    fn test_second_round_rotates_dealer_and_vulnerability() {
        let mut game = seated_game();
        game.start_round(HOST, Deck::ordered()).unwrap();
        for _ in 0..4 {
            pass(&mut game);
        }
        let out = game.start_round(HOST, Deck::ordered()).unwrap();
        let ServerEvent::GameStarted {
            current_player,
            game_number,
            vulnerability,
            ..
        } = &out[4].1
        else {
            panic!("expected game_started");
        };
        assert_eq!(*game_number, 2);
        assert_eq!(*current_player, Seat::East);
        assert_eq!(*vulnerability, Vulnerability { ns: true, ew: false });
    }

    // =====================================================================
    // play_card
    // =====================================================================

    fn card(suit: Suit, rank: u8) -> Card {
        Card::new(suit, Rank::new(rank).unwrap())
    }

    #[test]
    fn test_play_card_before_auction_is_wrong_phase() {
        let mut game = seated_game();
        game.start_round(HOST, Deck::ordered()).unwrap();
        let err = game.play_card(P2, card(Suit::Spades, 0), Seat::North).unwrap_err();
        assert_eq!(err.to_string(), "Not in playing phase");
    }

    #[test]
    fn test_play_card_out_of_turn() {
        let mut game = north_declares_one_spade();
        let err = game.play_card(P4, card(Suit::Diamonds, 0), Seat::South).unwrap_err();
        assert_eq!(err, GameError::NotYourTurn);
    }

    #[test]
    fn test_play_card_someone_elses_seat() {
        let mut game = north_declares_one_spade();
        // East is on lead; West tries to play for them.
        let err = game.play_card(HOST, card(Suit::Hearts, 0), Seat::East).unwrap_err();
        assert_eq!(err.to_string(), "You can only play your own cards");
    }

    #[test]
    fn test_play_card_opening_lead_reveals_dummy() {
        let mut game = north_declares_one_spade();
        let out = game.play_card(P3, card(Suit::Hearts, 12), Seat::East).unwrap();
        assert_eq!(kinds(&out), ["card_played", "dummy_revealed", "next_player"]);
        let ServerEvent::DummyRevealed {
            dummy_player,
            dummy_hand,
        } = &out[1].1
        else {
            panic!("expected dummy_revealed");
        };
        assert_eq!(*dummy_player, Seat::South);
        assert_eq!(dummy_hand.len(), 13);
        assert!(game.dummy_revealed());
        assert_eq!(game.hand(Seat::East).len(), 12);
        assert_eq!(game.turn(), Seat::South);
    }

    #[test]
    fn test_play_card_dummy_only_by_declarer() {
        let mut game = north_declares_one_spade();
        game.play_card(P3, card(Suit::Hearts, 12), Seat::East).unwrap();

        // South sits in dummy's chair but cannot play it.
        let err = game.play_card(P4, card(Suit::Diamonds, 0), Seat::South).unwrap_err();
        assert_eq!(err.to_string(), "Only declarer can play dummy's cards");

        let out = game.play_card(P2, card(Suit::Diamonds, 0), Seat::South).unwrap();
        assert_eq!(kinds(&out), ["card_played", "dummy_hand_updated", "next_player"]);
        assert_eq!(game.hand(Seat::South).len(), 12);
    }

    #[test]
    fn test_play_card_requires_a_seat() {
        let mut game = north_declares_one_spade();
        game.leave(P3);
        game.join(PlayerId(9)).unwrap();
        let err = game
            .play_card(PlayerId(9), card(Suit::Hearts, 0), Seat::East)
            .unwrap_err();
        assert_eq!(err.to_string(), "Player position not found");
    }

    #[test]
    fn test_play_card_absent_card_still_progresses() {
        let mut game = north_declares_one_spade();
        // East holds only hearts; the ♣A is not in that hand.
        let out = game.play_card(P3, card(Suit::Clubs, 12), Seat::East).unwrap();
        assert_eq!(kinds(&out)[0], "card_played");
        assert_eq!(game.hand(Seat::East).len(), 13);
        assert_eq!(game.current_trick().len(), 1);
        assert_eq!(game.play_history().len(), 1);
        assert_eq!(game.turn(), Seat::South);
    }

    #[test]
    fn test_play_card_fourth_card_resolves_trick() {
        let mut game = north_declares_one_spade();
        game.play_card(P3, card(Suit::Hearts, 12), Seat::East).unwrap();
        game.play_card(P2, card(Suit::Diamonds, 0), Seat::South).unwrap();
        game.play_card(HOST, card(Suit::Clubs, 0), Seat::West).unwrap();
        let out = game.play_card(P2, card(Suit::Spades, 0), Seat::North).unwrap();
        assert_eq!(kinds(&out), ["card_played", "trick_complete", "next_player"]);
        let ServerEvent::TrickComplete { winner, tricks } = &out[1].1 else {
            panic!("expected trick_complete");
        };
        assert_eq!(*winner, Seat::North);
        assert_eq!(*tricks, [0, 1, 0, 0]);
        assert!(game.current_trick().is_empty());
        assert_eq!(game.turn(), Seat::North);

        let last = game.play_history().last().unwrap();
        assert_eq!(last.trick_number, 1);
        assert_eq!(last.card_in_trick, 4);
    }
}
