use bevy_ecs::prelude::*;
use bevy_ecs::schedule::SystemSet;

use crate::core::rng::Dice;
use crate::simulation::cycle::CycleClock;
use crate::simulation::encounter::EncounterTable;
use crate::simulation::market::MarketPrices;
use crate::simulation::perks::PerkLog;
use crate::simulation::player::PlayerState;
use crate::systems::{market_system, perk_system, vitals_system};

/// Ordering of the work done after a player action commits.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum CommitSet {
    Vitals,
    Perks,
}

/// Build the ECS world with the run's resources.
pub fn create_world(
    player: PlayerState,
    dice: Dice,
    clock: CycleClock,
    encounters: EncounterTable,
) -> World {
    let mut world = World::new();
    world.insert_resource(player);
    world.insert_resource(dice);
    world.insert_resource(clock);
    world.insert_resource(encounters);
    world.insert_resource(MarketPrices::default());
    world.insert_resource(PerkLog::default());
    world
}

/// Runs once per cycle before the player is asked for an action.
pub fn create_open_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(market_system);
    schedule
}

/// Runs after every committed action.
pub fn create_commit_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.configure_sets((CommitSet::Vitals, CommitSet::Perks).chain());

    schedule.add_systems((
        vitals_system.in_set(CommitSet::Vitals),
        perk_system.in_set(CommitSet::Perks),
    ));

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedDice;
    use crate::data::catalog::{Node, Warez, Weapon};
    use crate::simulation::market::price_bounds;
    use crate::simulation::perks::Perk;

    fn world_at(node: Node) -> World {
        create_world(
            PlayerState::starting_at(node),
            Dice::new(ScriptedDice::new()),
            CycleClock::default(),
            EncounterTable::default(),
        )
    }

    #[test]
    fn open_schedule_prices_every_item_for_the_current_node() {
        let mut world = world_at(Node::Chateau);
        create_open_schedule().run(&mut world);
        let prices = world.resource::<MarketPrices>();
        for item in Warez::ALL {
            // scripted dice fall back to the low end
            assert_eq!(prices.price(item), Some(price_bounds(item, Node::Chateau).0));
        }
    }

    #[test]
    fn commit_schedule_unlocks_and_logs_perks() {
        let mut world = world_at(Node::Construct);
        {
            let mut player = world.resource_mut::<PlayerState>();
            for weapon in Weapon::ALL {
                player.add_weapon(weapon, 1);
            }
        }
        let mut commit = create_commit_schedule();
        commit.run(&mut world);
        assert_eq!(world.resource::<PerkLog>().0, vec![Perk::HeavilyArmed]);
        assert!(world.resource::<PlayerState>().has_perk(Perk::HeavilyArmed));

        world.resource_mut::<PerkLog>().drain();
        commit.run(&mut world);
        assert!(world.resource::<PerkLog>().0.is_empty());
    }
}
