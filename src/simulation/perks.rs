use std::fmt;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::catalog::Weapon;
use crate::simulation::player::PlayerState;

/// Wealth growth over `profit_start` needed for Data Broker.
pub const DATA_BROKER_GROWTH: f64 = 1.6;
pub const EDGE_RUNNER_ESCAPES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Perk {
    #[serde(rename = "Heavily Armed")]
    HeavilyArmed,
    #[serde(rename = "Edge Runner")]
    EdgeRunner,
    #[serde(rename = "Data Broker")]
    DataBroker,
    #[serde(rename = "Elite Operator")]
    EliteOperator,
}

impl Perk {
    pub const ALL: [Perk; 4] = [
        Perk::HeavilyArmed,
        Perk::EdgeRunner,
        Perk::DataBroker,
        Perk::EliteOperator,
    ];

    pub const BASE: [Perk; 3] = [Perk::HeavilyArmed, Perk::EdgeRunner, Perk::DataBroker];

    pub fn name(self) -> &'static str {
        match self {
            Perk::HeavilyArmed => "Heavily Armed",
            Perk::EdgeRunner => "Edge Runner",
            Perk::DataBroker => "Data Broker",
            Perk::EliteOperator => "Elite Operator",
        }
    }

    pub fn blurb(self) -> &'static str {
        match self {
            Perk::HeavilyArmed => "20% crit headshot chance",
            Perk::EdgeRunner => "70% escape chance",
            Perk::DataBroker => "10% trade bonus",
            Perk::EliteOperator => "Kung Fu unlocked",
        }
    }
}

impl fmt::Display for Perk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Perks unlocked since the frontend last drained the log.
#[derive(Resource, Debug, Default, Clone)]
pub struct PerkLog(pub Vec<Perk>);

impl PerkLog {
    pub fn drain(&mut self) -> Vec<Perk> {
        std::mem::take(&mut self.0)
    }
}

fn base_condition_met(perk: Perk, player: &PlayerState) -> bool {
    match perk {
        Perk::HeavilyArmed => Weapon::ALL
            .iter()
            .all(|weapon| player.weapon_count(*weapon) >= 1),
        Perk::EdgeRunner => player.escapes >= EDGE_RUNNER_ESCAPES,
        Perk::DataBroker => player.credits as f64 > player.profit_start as f64 * DATA_BROKER_GROWTH,
        Perk::EliteOperator => false,
    }
}

/// Unlocks every perk whose condition currently holds and returns the new
/// ones in unlock order. Base perks are checked before the composite one.
/// Never removes a perk, so re-running on an unchanged state is a no-op.
pub fn evaluate_perks(player: &mut PlayerState) -> Vec<Perk> {
    let mut unlocked = Vec::new();
    for perk in Perk::BASE {
        if !player.has_perk(perk) && base_condition_met(perk, player) {
            player.perks.insert(perk);
            unlocked.push(perk);
        }
    }
    let composite = Perk::EliteOperator;
    if !player.has_perk(composite) && Perk::BASE.iter().all(|perk| player.has_perk(*perk)) {
        player.perks.insert(composite);
        unlocked.push(composite);
    }
    unlocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::Node;

    fn fresh() -> PlayerState {
        PlayerState::starting_at(Node::Construct)
    }

    #[test]
    fn two_escapes_unlock_only_edge_runner() {
        let mut player = fresh();
        player.escapes = 2;
        assert_eq!(evaluate_perks(&mut player), vec![Perk::EdgeRunner]);
        assert_eq!(player.perks.iter().copied().collect::<Vec<_>>(), vec![Perk::EdgeRunner]);
    }

    #[test]
    fn one_escape_is_not_enough() {
        let mut player = fresh();
        player.escapes = 1;
        assert!(evaluate_perks(&mut player).is_empty());
    }

    #[test]
    fn heavily_armed_needs_every_weapon() {
        let mut player = fresh();
        player.add_weapon(Weapon::Beretta, 3);
        player.add_weapon(Weapon::Mp5k, 1);
        assert!(evaluate_perks(&mut player).is_empty());
        player.add_weapon(Weapon::M4Carbine, 1);
        assert_eq!(evaluate_perks(&mut player), vec![Perk::HeavilyArmed]);
    }

    #[test]
    fn data_broker_is_strictly_above_threshold() {
        let mut player = fresh();
        player.credits = 3_200;
        assert!(evaluate_perks(&mut player).is_empty());
        player.credits = 3_201;
        assert_eq!(evaluate_perks(&mut player), vec![Perk::DataBroker]);
    }

    #[test]
    fn composite_unlocks_in_the_same_pass_as_the_last_base_perk() {
        let mut player = fresh();
        player.escapes = 2;
        evaluate_perks(&mut player);
        player.credits = 10_000;
        for weapon in Weapon::ALL {
            player.add_weapon(weapon, 1);
        }
        let unlocked = evaluate_perks(&mut player);
        assert_eq!(
            unlocked,
            vec![Perk::HeavilyArmed, Perk::DataBroker, Perk::EliteOperator]
        );
        assert_eq!(player.perks.len(), 4);
    }

    #[test]
    fn perks_survive_losing_their_condition() {
        let mut player = fresh();
        player.credits = 5_000;
        evaluate_perks(&mut player);
        player.credits = 0;
        assert!(evaluate_perks(&mut player).is_empty());
        assert!(player.has_perk(Perk::DataBroker));
    }

    #[test]
    fn re_evaluation_is_idempotent() {
        let mut player = fresh();
        player.escapes = 4;
        player.credits = 9_999;
        evaluate_perks(&mut player);
        let before = player.clone();
        assert!(evaluate_perks(&mut player).is_empty());
        assert_eq!(player, before);
    }
}
