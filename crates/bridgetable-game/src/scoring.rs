//! Duplicate bridge scoring.
//!
//! [`score`] is a pure function of the contract, the trick counts and
//! the vulnerability. A made contract scores only for declarer's side;
//! a failed one scores only the defenders' undertrick penalty.

use bridgetable_protocol::{Partnership, Strain};
use serde::{Deserialize, Serialize};

use crate::{Contract, DoubleStatus, Vulnerability};

/// Component points for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub contract_points: u32,
    pub overtrick_points: u32,
    pub slam_bonus: u32,
    pub double_bonus: u32,
    pub game_bonus: u32,
    pub undertrick_penalty: u32,
    pub total: u32,
}

/// The scored result of a round, for both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub declarer_partnership: Partnership,
    pub declarer_score: ScoreBreakdown,
    pub defender_score: ScoreBreakdown,
    pub contract_made: bool,
    pub tricks_taken: u8,
    pub tricks_needed: u8,
}

impl ScoreReport {
    /// The all-zero report of a passed-out round.
    pub fn passed_out() -> Self {
        Self {
            declarer_partnership: Partnership::EastWest,
            declarer_score: ScoreBreakdown::default(),
            defender_score: ScoreBreakdown::default(),
            contract_made: false,
            tricks_taken: 0,
            tricks_needed: 0,
        }
    }
}

fn per_trick(strain: Strain) -> u32 {
    if strain.is_minor() { 20 } else { 30 }
}

fn undertrick_penalty(undertricks: u32, doubling: DoubleStatus, vulnerable: bool) -> u32 {
    let doubled_step = |i: u32| match (i, vulnerable) {
        (0, false) => 100,
        (0, true) => 200,
        (1 | 2, false) => 200,
        (1 | 2, true) => 300,
        _ => 300,
    };
    match doubling {
        DoubleStatus::Undoubled => undertricks * if vulnerable { 100 } else { 50 },
        DoubleStatus::Doubled => (0..undertricks).map(doubled_step).sum(),
        DoubleStatus::Redoubled => (0..undertricks).map(|i| 2 * doubled_step(i)).sum(),
    }
}

/// Scores a played-out contract.
///
/// `tricks_won` is indexed by seat; the declaring side's tricks are the
/// declarer's plus dummy's.
pub fn score(contract: &Contract, tricks_won: [u8; 4], vulnerability: Vulnerability) -> ScoreReport {
    let partnership = contract.partnership();
    let vulnerable = vulnerability.is_vulnerable(partnership);
    let tricks_taken: u8 = partnership
        .seats()
        .iter()
        .map(|seat| tricks_won[seat.index()])
        .sum();
    let tricks_needed = contract.tricks_needed();
    let contract_made = tricks_taken >= tricks_needed;

    let mut declarer = ScoreBreakdown::default();
    let mut defender = ScoreBreakdown::default();

    if contract_made {
        let level = u32::from(contract.level);
        let overtricks = u32::from(tricks_taken - tricks_needed);
        let base = per_trick(contract.strain);

        let mut contract_points = level * base;
        if contract.strain == Strain::NoTrump {
            contract_points += 40;
        }

        let (multiplier, double_bonus, overtrick_value) = match contract.doubling {
            DoubleStatus::Undoubled => (1, 0, base),
            DoubleStatus::Doubled => (2, 50, if vulnerable { 200 } else { 100 }),
            DoubleStatus::Redoubled => (4, 100, if vulnerable { 400 } else { 200 }),
        };
        declarer.contract_points = contract_points * multiplier;
        declarer.double_bonus = double_bonus;
        declarer.overtrick_points = overtricks * overtrick_value;

        declarer.game_bonus = match (declarer.contract_points >= 100, vulnerable) {
            (true, false) => 300,
            (true, true) => 500,
            (false, _) => 50,
        };
        declarer.slam_bonus = match (contract.level, vulnerable) {
            (6, false) => 500,
            (6, true) => 750,
            (7, false) => 1000,
            (7, true) => 1500,
            _ => 0,
        };
        declarer.total = declarer.contract_points
            + declarer.overtrick_points
            + declarer.slam_bonus
            + declarer.double_bonus
            + declarer.game_bonus;
    } else {
        let undertricks = u32::from(tricks_needed - tricks_taken);
        defender.undertrick_penalty = undertrick_penalty(undertricks, contract.doubling, vulnerable);
        defender.total = defender.undertrick_penalty;
    }

    ScoreReport {
        declarer_partnership: partnership,
        declarer_score: declarer,
        defender_score: defender,
        contract_made,
        tricks_taken,
        tricks_needed,
    }
}
