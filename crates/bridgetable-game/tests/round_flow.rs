//! Whole rounds driven through the public `Game` API.
//!
//! Dealing `Deck::ordered()` gives north all spades, east all hearts,
//! south all diamonds and west all clubs, which makes every trick's
//! outcome predictable.

use bridgetable_game::{
    Deck, Game, Outbound, Phase, ScoreBreakdown, ServerEvent, TRICKS_PER_ROUND, Vulnerability,
};
use bridgetable_protocol::{Denomination, PlayerId, Recipient, Seat, SessionId};

const WEST: PlayerId = PlayerId(10);
const NORTH: PlayerId = PlayerId(11);
const EAST: PlayerId = PlayerId(12);
const SOUTH: PlayerId = PlayerId(13);

fn player_at(seat: Seat) -> PlayerId {
    match seat {
        Seat::West => WEST,
        Seat::North => NORTH,
        Seat::East => EAST,
        Seat::South => SOUTH,
    }
}

fn table() -> Game {
    let (mut game, _) = Game::create(SessionId::new("round1"), WEST);
    for p in [NORTH, EAST, SOUTH] {
        game.join(p).unwrap();
    }
    for seat in Seat::ALL {
        game.claim_seat(player_at(seat), seat.name()).unwrap();
    }
    game
}

fn bid(game: &mut Game, level: u8, denomination: Denomination) -> Outbound {
    let seat = game.turn();
    game.submit_bid(player_at(seat), level, denomination, seat, format!("{level}{denomination}"))
        .unwrap()
}

fn pass(game: &mut Game) -> Outbound {
    bid(game, 0, Denomination::Pass)
}

/// Plays out the hand: each seat plays its lowest card, declarer plays
/// for dummy. Returns every event emitted.
fn play_out(game: &mut Game) -> Outbound {
    let contract = *game.contract().unwrap();
    let mut all = Vec::new();
    while game.phase() == Phase::Playing {
        let seat = game.turn();
        let requester = if seat == contract.dummy() {
            player_at(contract.declarer)
        } else {
            player_at(seat)
        };
        let card = game.hand(seat).cards().next().unwrap();
        all.extend(game.play_card(requester, card, seat).unwrap());
    }
    all
}

fn game_over(out: &Outbound) -> &ServerEvent {
    let (recipient, event) = out
        .iter()
        .find(|(_, e)| matches!(e, ServerEvent::GameOver { .. }))
        .expect("round should end with game_over");
    assert_eq!(*recipient, Recipient::All);
    event
}

#[test]
fn test_one_spade_by_north_takes_every_trick() {
    let mut game = table();
    game.start_round(WEST, Deck::ordered()).unwrap();
    bid(&mut game, 1, Denomination::Spades);
    pass(&mut game);
    pass(&mut game);
    let out = pass(&mut game);
    assert!(matches!(
        out.last().unwrap().1,
        ServerEvent::BiddingEnded {
            current_player: Seat::East,
            ..
        }
    ));

    let out = play_out(&mut game);

    let reveals = out
        .iter()
        .filter(|(_, e)| matches!(e, ServerEvent::DummyRevealed { .. }))
        .count();
    assert_eq!(reveals, 1);
    let dummy_updates = out
        .iter()
        .filter(|(_, e)| matches!(e, ServerEvent::DummyHandUpdated { .. }))
        .count();
    assert_eq!(dummy_updates, 13);

    let ServerEvent::GameOver {
        tricks,
        score,
        game_number,
        passed_out,
        ..
    } = game_over(&out)
    else {
        unreachable!();
    };
    assert_eq!(*tricks, [0, 13, 0, 0]);
    assert_eq!(*game_number, 1);
    assert!(!passed_out);
    assert!(score.contract_made);
    assert_eq!(score.tricks_taken, 13);
    assert_eq!(score.tricks_needed, 7);
    assert_eq!(score.declarer_score.contract_points, 30);
    assert_eq!(score.declarer_score.overtrick_points, 180);
    assert_eq!(score.declarer_score.game_bonus, 50);
    assert_eq!(score.declarer_score.total, 260);
    assert_eq!(score.defender_score, ScoreBreakdown::default());

    assert_eq!(game.phase(), Phase::Lobby);
    assert!(game.contract().is_none());
    assert_eq!(game.round(), 2);
    for seat in Seat::ALL {
        assert!(game.hand(seat).is_empty());
    }

    let record = &game.history()[0];
    assert_eq!(record.play_history.len(), 52);
    assert_eq!(record.play_history[51].trick_number, TRICKS_PER_ROUND);
    assert_eq!(record.declarer, Some(Seat::North));
    assert_eq!(record.dummy, Some(Seat::South));
    assert_eq!(record.bidding_history.len(), 4);
    assert_eq!(record.vulnerability, Vulnerability::for_round(1));
}

#[test]
fn test_seven_no_trump_goes_down_thirteen() {
    let mut game = table();
    game.start_round(WEST, Deck::ordered()).unwrap();
    bid(&mut game, 7, Denomination::NoTrump);
    pass(&mut game);
    pass(&mut game);
    pass(&mut game);

    // East leads hearts every trick and nobody else holds one.
    let out = play_out(&mut game);
    let ServerEvent::GameOver { tricks, score, .. } = game_over(&out) else {
        unreachable!();
    };
    assert_eq!(*tricks, [0, 0, 13, 0]);
    assert!(!score.contract_made);
    assert_eq!(score.defender_score.undertrick_penalty, 13 * 50);
    assert_eq!(score.declarer_score.total, 0);
}

#[test]
fn test_rounds_accumulate_history_and_rotate() {
    let mut game = table();

    game.start_round(WEST, Deck::ordered()).unwrap();
    for _ in 0..4 {
        pass(&mut game);
    }

    let out = game.start_round(WEST, Deck::ordered()).unwrap();
    assert!(out.iter().any(|(_, e)| matches!(
        e,
        ServerEvent::GameStarted {
            game_number: 2,
            current_player: Seat::East,
            ..
        }
    )));
    bid(&mut game, 2, Denomination::Hearts); // East
    pass(&mut game);
    pass(&mut game);
    pass(&mut game);
    assert_eq!(game.contract().unwrap().declarer, Seat::East);
    play_out(&mut game);

    assert_eq!(game.history().len(), 2);
    assert!(game.history()[0].passed_out);
    assert!(!game.history()[1].passed_out);
    assert_eq!(game.history()[1].game_number, 2);
    assert_eq!(game.history()[1].vulnerability, Vulnerability { ns: true, ew: false });
    assert_eq!(game.round(), 3);
}

#[test]
fn test_history_record_serializes_for_archives() {
    let mut game = table();
    game.start_round(WEST, Deck::ordered()).unwrap();
    for _ in 0..4 {
        pass(&mut game);
    }
    let json = serde_json::to_value(&game.history()[0]).unwrap();
    assert_eq!(json["game_number"], 1);
    assert_eq!(json["passed_out"], true);
    assert!(json["contract"].is_null());
    assert_eq!(json["bidding_history"][0]["suit"], "Pass");
    assert_eq!(json["score"]["declarer_score"]["total"], 0);
}
