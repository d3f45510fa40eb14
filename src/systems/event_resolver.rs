use std::fmt;

use bevy_utils::tracing::info;

use crate::core::rng::RandomSource;
use crate::simulation::combat::{CombatEnd, OpponentKind, VictoryReward};
use crate::simulation::encounter::{EncounterKind, EncounterTable};
use crate::simulation::player::{PlayerState, MAX_VITAL};

/// Share of current credits an agent trace siphons off.
pub const TRACE_RATIO: f64 = 0.20;
pub const MEDIC_HEAL: (i64, i64) = (10, 15);
pub const MEDIC_JACKPOT_CHANCE: f64 = 0.05;
pub const MEDIC_JACKPOT_HEAL: i32 = 25;
pub const MEDIC_ARMOR_GRANT: i32 = 20;
pub const CIVILIAN_NUMBERS: (i64, i64) = (1, 10);
pub const CIVILIAN_TOLERANCE: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedicOutcome {
    Healed(i32),
    Armored(i32),
    NothingNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CivilianOutcome {
    Freed,
    /// Wrong number: the civilian turns and a Smith ambush follows.
    Turned,
    /// No usable guess; the moment passes.
    Hesitated,
}

/// What happened at the start of a cycle, for the frontend to show.
#[derive(Debug, Clone, PartialEq)]
pub enum EncounterReport {
    Trace { penalty: i64 },
    Medic(MedicOutcome),
    Civilian(CivilianOutcome),
    Combat {
        opponent: OpponentKind,
        end: CombatEnd,
        reward: Option<VictoryReward>,
    },
}

impl fmt::Display for EncounterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncounterReport::Trace { penalty } => write!(f, "AGENT TRACE! -{}cr", penalty),
            EncounterReport::Medic(MedicOutcome::Healed(amount)) => {
                write!(f, "Blasko heals +{}% life", amount)
            }
            EncounterReport::Medic(MedicOutcome::Armored(amount)) => {
                write!(f, "Blasko grants +{}% armor", amount)
            }
            EncounterReport::Medic(MedicOutcome::NothingNeeded) => {
                write!(f, "Blasko checks you over. Armor already active.")
            }
            EncounterReport::Civilian(CivilianOutcome::Freed) => {
                write!(f, "Red pill! Mind freed.")
            }
            EncounterReport::Civilian(CivilianOutcome::Turned) => {
                write!(f, "Blue pill! The civilian becomes an Agent.")
            }
            EncounterReport::Civilian(CivilianOutcome::Hesitated) => {
                write!(f, "The moment passes.")
            }
            EncounterReport::Combat {
                opponent,
                end,
                reward,
            } => match (end, reward) {
                (CombatEnd::OpponentDefeated, Some(reward)) => write!(
                    f,
                    "{} down! Found {}, +{}cr",
                    opponent.label(),
                    reward.loot,
                    reward.credits
                ),
                (CombatEnd::OpponentDefeated, None) => write!(f, "{} down!", opponent.label()),
                (CombatEnd::PlayerEscaped, _) => {
                    write!(f, "You slipped away from the {}.", opponent.label())
                }
                (CombatEnd::PlayerDefeated, _) => {
                    write!(f, "The {} flatlined you.", opponent.label())
                }
            },
        }
    }
}

/// One uniform draw, classified against the band table.
pub fn roll_encounter(table: &EncounterTable, dice: &mut dyn RandomSource) -> Option<EncounterKind> {
    let roll = dice.unit();
    let kind = table.classify(roll);
    if let Some(kind) = kind {
        info!(roll, %kind, "encounter");
    }
    kind
}

/// Siphons a share of the player's credits. A negative balance loses nothing,
/// so a trace never drives credits below zero.
pub fn apply_trace(player: &mut PlayerState) -> i64 {
    let penalty = (player.credits.max(0) as f64 * TRACE_RATIO).floor() as i64;
    player.credits -= penalty;
    penalty
}

pub fn field_medic(player: &mut PlayerState, dice: &mut dyn RandomSource) -> MedicOutcome {
    if player.life() < MAX_VITAL {
        let mut heal = dice.between(MEDIC_HEAL.0, MEDIC_HEAL.1) as i32;
        if dice.unit() < MEDIC_JACKPOT_CHANCE {
            heal = MEDIC_JACKPOT_HEAL;
        }
        player.adjust_life(heal);
        MedicOutcome::Healed(heal)
    } else if player.armor() == 0 {
        player.adjust_armor(MEDIC_ARMOR_GRANT);
        MedicOutcome::Armored(MEDIC_ARMOR_GRANT)
    } else {
        MedicOutcome::NothingNeeded
    }
}

pub fn roll_civilian_secret(dice: &mut dyn RandomSource) -> i64 {
    dice.between(CIVILIAN_NUMBERS.0, CIVILIAN_NUMBERS.1)
}

/// Any integer counts as a guess, in range or not. Only a missing guess is skipped.
pub fn judge_civilian(
    player: &mut PlayerState,
    secret: i64,
    guess: Option<i64>,
) -> CivilianOutcome {
    let Some(guess) = guess else {
        return CivilianOutcome::Hesitated;
    };
    if guess.abs_diff(secret) <= CIVILIAN_TOLERANCE.unsigned_abs() {
        player.people_freed = player.people_freed.saturating_add(1);
        CivilianOutcome::Freed
    } else {
        CivilianOutcome::Turned
    }
}
