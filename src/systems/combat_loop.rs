use bevy_utils::tracing::debug;

use crate::core::rng::RandomSource;
use crate::data::catalog::Weapon;
use crate::simulation::combat::{
    loot_table, Armament, CombatCommand, CombatEnd, CombatPhase, CombatState, Loot, OpponentKind,
    VictoryReward,
};
use crate::simulation::perks::Perk;
use crate::simulation::player::PlayerState;

pub const FLEE_CHANCE: f64 = 0.5;
pub const EDGE_RUNNER_FLEE_CHANCE: f64 = 0.7;
pub const FAILED_FLEE_PENALTY: i32 = 15;
pub const CRIT_CHANCE: f64 = 0.2;
pub const KUNG_FU_DAMAGE: i32 = 20;
pub const KUNG_FU_ODDS: f64 = 0.85;
pub const OPPONENT_HIT_CHANCE: f64 = 0.5;
/// Each armor point shaves this much off the opponent's hit chance.
pub const ARMOR_DEFLECTION: f64 = 0.001;
pub const ARMOR_WEAR: i32 = 10;
pub const OPPONENT_DAMAGE: (i64, i64) = (5, 15);
pub const VICTORY_CREDITS: (i64, i64) = (50, 200);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CombatTickResult {
    /// False when the command did not fit the current phase or was blocked.
    pub accepted: bool,
    pub ended: Option<CombatEnd>,
    pub damage_dealt: i32,
    pub damage_taken: i32,
}

pub fn start_combat(opponent: OpponentKind) -> CombatState {
    debug!(?opponent, "combat started");
    CombatState::new(opponent)
}

/// Owned weapons in catalog order, plus Kung Fu for Elite Operators.
pub fn armament_options(player: &PlayerState) -> Vec<Armament> {
    let mut options: Vec<Armament> = Weapon::ALL
        .iter()
        .filter(|weapon| player.weapon_count(**weapon) > 0)
        .map(|weapon| Armament::Weapon(*weapon))
        .collect();
    if player.has_perk(Perk::EliteOperator) {
        options.push(Armament::KungFu);
    }
    options
}

pub fn flee_chance(player: &PlayerState) -> f64 {
    if player.has_perk(Perk::EdgeRunner) {
        EDGE_RUNNER_FLEE_CHANCE
    } else {
        FLEE_CHANCE
    }
}

pub fn opponent_hit_chance(player: &PlayerState) -> f64 {
    (OPPONENT_HIT_CHANCE - player.armor() as f64 * ARMOR_DEFLECTION).max(0.0)
}

/// Feeds one player command through the encounter state machine and resolves
/// whatever the command sets in motion.
pub fn combat_step(
    state: &mut CombatState,
    player: &mut PlayerState,
    command: CombatCommand,
    dice: &mut dyn RandomSource,
) -> CombatTickResult {
    let mut result = CombatTickResult::default();
    if state.is_over() {
        return result;
    }

    match (state.phase, command) {
        (CombatPhase::ChoosingAction, CombatCommand::Fight) => {
            state.phase = CombatPhase::SelectingWeapon;
            result.accepted = true;
        }
        (CombatPhase::ChoosingAction, CombatCommand::Flee) => {
            state.phase = CombatPhase::Fleeing;
            result.accepted = true;
        }
        (CombatPhase::SelectingWeapon, CombatCommand::Back) => {
            state.phase = CombatPhase::ChoosingAction;
            result.accepted = true;
        }
        (CombatPhase::SelectingWeapon, CombatCommand::Select(index)) => {
            match armament_options(player).get(index).copied() {
                None => state.log.push("Invalid selection.".to_string()),
                Some(Armament::Weapon(weapon)) if player.supply(weapon.stats().ammo) == 0 => {
                    state.log.push(format!("No ammo for {}!", weapon));
                }
                Some(armament) => {
                    state.phase = CombatPhase::Resolving(armament);
                    result.accepted = true;
                }
            }
        }
        _ => {}
    }

    match state.phase {
        CombatPhase::Fleeing => resolve_flee(state, player, dice, &mut result),
        CombatPhase::Resolving(armament) => {
            resolve_attack(state, player, armament, dice, &mut result)
        }
        _ => {}
    }

    result.ended = state.ended();
    result
}

fn resolve_flee(
    state: &mut CombatState,
    player: &mut PlayerState,
    dice: &mut dyn RandomSource,
    result: &mut CombatTickResult,
) {
    state.round += 1;
    if dice.unit() < flee_chance(player) {
        player.escapes = player.escapes.saturating_add(1);
        state.log.push("Escaped safely!".to_string());
        finish_combat(state, CombatEnd::PlayerEscaped);
        return;
    }

    let before = player.life();
    player.adjust_life(-FAILED_FLEE_PENALTY);
    result.damage_taken += before - player.life();
    state.log.push(format!(
        "Failed to run! -{}% life",
        FAILED_FLEE_PENALTY
    ));
    if player.is_alive() {
        state.phase = CombatPhase::ChoosingAction;
    } else {
        finish_combat(state, CombatEnd::PlayerDefeated);
    }
}

fn resolve_attack(
    state: &mut CombatState,
    player: &mut PlayerState,
    armament: Armament,
    dice: &mut dyn RandomSource,
    result: &mut CombatTickResult,
) {
    state.round += 1;
    let hp_before = state.opponent_hp;

    match armament {
        Armament::Weapon(weapon) => {
            let stats = weapon.stats();
            if !player.take_supply(stats.ammo, 1) {
                state.log.push(format!("No ammo for {}!", weapon));
                state.phase = CombatPhase::SelectingWeapon;
                return;
            }
            if player.has_perk(Perk::HeavilyArmed) && dice.unit() < CRIT_CHANCE {
                state.opponent_hp = 0;
                state.log.push("DODGE THIS! Critical!".to_string());
            } else if state.opponent.dodge() > 0.0 && dice.unit() < state.opponent.dodge() {
                state
                    .log
                    .push(format!("{} dodges the shot!", state.opponent.label()));
            } else if dice.unit() < stats.accuracy {
                state.opponent_hp -= stats.damage;
                state.log.push(format!("Hit! -{} HP", stats.damage));
            } else {
                state.log.push("Miss!".to_string());
            }
        }
        Armament::KungFu => {
            if dice.unit() < KUNG_FU_ODDS {
                state.opponent_hp -= KUNG_FU_DAMAGE;
                state.log.push(format!("Kung Fu! -{} HP", KUNG_FU_DAMAGE));
            } else {
                state.log.push("Kung Fu blocked!".to_string());
            }
        }
    }

    state.opponent_hp = state.opponent_hp.max(0);
    result.damage_dealt += hp_before - state.opponent_hp;

    if state.opponent_hp == 0 {
        award_victory(state, player, dice);
        finish_combat(state, CombatEnd::OpponentDefeated);
        return;
    }

    opponent_turn(state, player, dice, result);
}

fn opponent_turn(
    state: &mut CombatState,
    player: &mut PlayerState,
    dice: &mut dyn RandomSource,
    result: &mut CombatTickResult,
) {
    let label = state.opponent.label();
    if dice.unit() < opponent_hit_chance(player) {
        let damage = dice.between(OPPONENT_DAMAGE.0, OPPONENT_DAMAGE.1) as i32;
        let before = player.life();
        player.adjust_life(-damage);
        player.adjust_armor(-ARMOR_WEAR);
        result.damage_taken += before - player.life();
        state.log.push(format!("{} hits you -{}% life", label, damage));
    } else {
        state.log.push(format!("{} missed!", label));
    }

    if player.is_alive() {
        state.phase = CombatPhase::ChoosingAction;
    } else {
        finish_combat(state, CombatEnd::PlayerDefeated);
    }
}

fn award_victory(state: &mut CombatState, player: &mut PlayerState, dice: &mut dyn RandomSource) {
    let credits = dice.between(VICTORY_CREDITS.0, VICTORY_CREDITS.1);
    let table = loot_table();
    let loot = table[dice.index(table.len())];
    player.credits += credits;
    match loot {
        Loot::Warez(item) => player.add_warez(item, 1),
        Loot::Weapon(weapon) => player.add_weapon(weapon, 1),
        Loot::Supply(supply) => player.add_supply(supply, 1),
    }
    state.log.push(format!("Opponent down! Found {}, +{}cr", loot, credits));
    state.reward = Some(VictoryReward { credits, loot });
}

fn finish_combat(state: &mut CombatState, reason: CombatEnd) {
    state.phase = CombatPhase::Ended(reason);
    debug!(?reason, rounds = state.round, "combat ended");
}
