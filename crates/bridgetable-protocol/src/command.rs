//! The closed set of client requests.
//!
//! A command arrives either as a JSON document
//! (`{"type":"play_card","suit":"hearts","rank":12,"seat":2}`) or as one
//! of the colon-delimited lines older clients send:
//!
//! ```text
//! create:
//! join:<code>
//! iam:<seat name>
//! start:
//! bid:<level>:<denomination>:<player label>:<seat index>:<display>
//! play:<suit>:<rank>:<seat index>
//! ```
//!
//! Both forms produce the same [`ClientCommand`], and both pass the same
//! validation, so the game engine only ever sees well-typed requests.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Codec, Denomination, ProtocolError, Rank, Seat, SessionId, Suit};

/// Highest bidding level.
const MAX_LEVEL: u8 = 7;

/// A request from a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Open a new four-seat session with the requester as host.
    CreateSession,

    /// Join an existing session by its code.
    JoinSession { session_id: SessionId },

    /// Sit at a seat. The name is checked by the game, which answers an
    /// unknown name with an `InvalidSeat` error rather than a decode
    /// failure.
    ClaimSeat { seat: String },

    /// Host only: deal a new round.
    StartRound,

    /// One auction entry. `level` is 0 for Pass/Double/Redouble and 1–7
    /// for a real bid.
    SubmitBid {
        level: u8,
        denomination: Denomination,
        seat: Seat,
        display: String,
    },

    /// Play a card belonging to `seat` (the dummy's seat when declarer
    /// plays from the board).
    PlayCard { suit: Suit, rank: Rank, seat: Seat },
}

impl ClientCommand {
    /// Decodes one inbound frame: JSON when it looks like an object,
    /// the legacy text grammar otherwise.
    pub fn from_frame(frame: &str, codec: &impl Codec) -> Result<Self, ProtocolError> {
        let trimmed = frame.trim();
        let command: ClientCommand = if trimmed.starts_with('{') {
            codec.decode(trimmed)?
        } else {
            trimmed.parse()?
        };
        command.validate()?;
        Ok(command)
    }

    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::CreateSession => "create_session",
            ClientCommand::JoinSession { .. } => "join_session",
            ClientCommand::ClaimSeat { .. } => "claim_seat",
            ClientCommand::StartRound => "start_round",
            ClientCommand::SubmitBid { .. } => "submit_bid",
            ClientCommand::PlayCard { .. } => "play_card",
        }
    }

    /// Checks field combinations serde cannot express.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            ClientCommand::JoinSession { session_id } if session_id.as_str().is_empty() => Err(
                ProtocolError::BadCommand("session code must not be empty".into()),
            ),
            ClientCommand::SubmitBid {
                level,
                denomination,
                ..
            } => {
                if *level > MAX_LEVEL {
                    return Err(ProtocolError::BadCommand(format!(
                        "bid level {level} out of range 0-{MAX_LEVEL}"
                    )));
                }
                match (denomination.is_marker(), *level == 0) {
                    (true, true) | (false, false) => Ok(()),
                    (true, false) => Err(ProtocolError::BadCommand(format!(
                        "{denomination} must be bid at level 0"
                    ))),
                    (false, true) => Err(ProtocolError::BadCommand(format!(
                        "a {denomination} bid needs a level from 1 to {MAX_LEVEL}"
                    ))),
                }
            }
            _ => Ok(()),
        }
    }
}

fn parse_field<T: FromStr>(value: &str, what: &str) -> Result<T, ProtocolError> {
    value
        .trim()
        .parse()
        .map_err(|_| ProtocolError::BadCommand(format!("invalid {what}: {value:?}")))
}

fn parse_seat_index(value: &str) -> Result<Seat, ProtocolError> {
    let index: u8 = parse_field(value, "seat index")?;
    Seat::try_from(index)
}

fn parse_rank(value: &str) -> Result<Rank, ProtocolError> {
    let rank: u8 = parse_field(value, "rank")?;
    Rank::try_from(rank)
}

impl FromStr for ClientCommand {
    type Err = ProtocolError;

    /// Parses the colon-delimited text form.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (verb, rest) = line
            .split_once(':')
            .ok_or_else(|| ProtocolError::BadCommand(format!("unrecognized command {line:?}")))?;

        match verb {
            "create" => Ok(ClientCommand::CreateSession),
            "start" => Ok(ClientCommand::StartRound),
            "join" => {
                let code = rest.split(':').next().unwrap_or_default().trim();
                Ok(ClientCommand::JoinSession {
                    session_id: SessionId::new(code),
                })
            }
            "iam" => {
                let seat = rest.split(':').next().unwrap_or_default();
                Ok(ClientCommand::ClaimSeat {
                    seat: seat.to_owned(),
                })
            }
            "bid" => {
                // level:denomination:label:seat:display; the display text
                // may itself contain colons.
                let parts: Vec<&str> = rest.splitn(5, ':').collect();
                let [level, denomination, _label, seat, display] = parts[..] else {
                    return Err(ProtocolError::BadCommand(
                        "bid needs level:denomination:player:seat:display".into(),
                    ));
                };
                Ok(ClientCommand::SubmitBid {
                    level: parse_field(level, "bid level")?,
                    denomination: denomination.parse()?,
                    seat: parse_seat_index(seat)?,
                    display: display.to_owned(),
                })
            }
            "play" => {
                let parts: Vec<&str> = rest.split(':').collect();
                let [suit, rank, seat, ..] = parts[..] else {
                    return Err(ProtocolError::BadCommand(
                        "play needs suit:rank:seat".into(),
                    ));
                };
                Ok(ClientCommand::PlayCard {
                    suit: suit.parse()?,
                    rank: parse_rank(rank)?,
                    seat: parse_seat_index(seat)?,
                })
            }
            other => Err(ProtocolError::BadCommand(format!(
                "unrecognized command {other:?}"
            ))),
        }
    }
}
