//! Events the game emits for connected players.
//!
//! Serialized internally tagged, e.g.
//! `{"type":"next_player","current_player":2}`. Seats are integers
//! `0..=3` (west, north, east, south) and hands are sorted card-id arrays.

use bridgetable_protocol::{Card, Recipient, Seat, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Bid, Contract, Hand, ScoreReport, Vulnerability};

/// Events addressed to their recipients, in delivery order.
pub type Outbound = Vec<(Recipient, ServerEvent)>;

/// One player's view of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateView {
    pub game_id: SessionId,
    pub last_updated: DateTime<Utc>,
    /// Player labels in join order.
    pub players: Vec<String>,
    pub north: Option<String>,
    pub south: Option<String>,
    pub east: Option<String>,
    pub west: Option<String>,
    pub your_name: String,
    pub your_index: usize,
    pub is_host: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent to the creator of a new session.
    GameCode { code: SessionId },

    GameState(GameStateView),

    /// A seat's private hand.
    Hand { hand: Hand },

    GameStarted {
        message: String,
        current_player: Seat,
        game_number: u32,
        vulnerability: Vulnerability,
    },

    Bid { bid: Bid },

    NextPlayer { current_player: Seat },

    BiddingEnded {
        contract: Contract,
        current_player: Seat,
    },

    CardPlayed { card: Card, player: Seat },

    DummyRevealed { dummy_player: Seat, dummy_hand: Hand },

    DummyHandUpdated { dummy_player: Seat, dummy_hand: Hand },

    TrickComplete { winner: Seat, tricks: [u8; 4] },

    GameOver {
        tricks: [u8; 4],
        contract: Option<Contract>,
        score: ScoreReport,
        game_number: u32,
        vulnerability: Vulnerability,
        passed_out: bool,
    },

    /// A rejected request; sent only to the requester.
    Error { message: String },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    /// The `type` tag, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::GameCode { .. } => "game_code",
            ServerEvent::GameState(_) => "game_state",
            ServerEvent::Hand { .. } => "hand",
            ServerEvent::GameStarted { .. } => "game_started",
            ServerEvent::Bid { .. } => "bid",
            ServerEvent::NextPlayer { .. } => "next_player",
            ServerEvent::BiddingEnded { .. } => "bidding_ended",
            ServerEvent::CardPlayed { .. } => "card_played",
            ServerEvent::DummyRevealed { .. } => "dummy_revealed",
            ServerEvent::DummyHandUpdated { .. } => "dummy_hand_updated",
            ServerEvent::TrickComplete { .. } => "trick_complete",
            ServerEvent::GameOver { .. } => "game_over",
            ServerEvent::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridgetable_protocol::{Rank, Suit};

    #[test]
    fn test_event_tags_are_snake_case() {
        let json = serde_json::to_value(ServerEvent::NextPlayer {
            current_player: Seat::East,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "next_player", "current_player": 2}));
    }

    #[test]
    fn test_game_state_fields_are_flattened_under_tag() {
        let view = GameStateView {
            game_id: SessionId::new("abc123"),
            last_updated: Utc::now(),
            players: vec!["alpha".into(), "beta".into()],
            north: Some("beta".into()),
            south: None,
            east: None,
            west: Some("alpha".into()),
            your_name: "beta".into(),
            your_index: 1,
            is_host: false,
        };
        let json = serde_json::to_value(ServerEvent::GameState(view)).unwrap();
        assert_eq!(json["type"], "game_state");
        assert_eq!(json["game_id"], "abc123");
        assert_eq!(json["north"], "beta");
        assert!(json["south"].is_null());
        assert_eq!(json["your_index"], 1);
    }

    #[test]
    fn test_card_played_shape() {
        let event = ServerEvent::CardPlayed {
            card: Card::new(Suit::Spades, Rank::new(3).unwrap()),
            player: Seat::West,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "card_played", "card": {"suit": "spades", "rank": 3}, "player": 0})
        );
        assert_eq!(event.kind(), "card_played");
    }

    #[test]
    fn test_error_event_shape() {
        let json = serde_json::to_value(ServerEvent::error("Not your turn")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "error", "message": "Not your turn"}));
    }
}
