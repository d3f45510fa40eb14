use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::rng::RandomSource;
use crate::data::catalog::{Node, Supply, Warez, Weapon};
use crate::simulation::perks::Perk;

pub const STARTING_CREDITS: i64 = 2_000;
pub const MAX_VITAL: i32 = 100;
pub const STARTING_CYCLE: f64 = 1.0;

/// The single mutable aggregate for a run. Persisted as-is.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub credits: i64,
    life: i32,
    armor: i32,
    #[serde(default)]
    pub inventory: BTreeMap<Warez, u32>,
    #[serde(default)]
    pub weapons: BTreeMap<Weapon, u32>,
    #[serde(default)]
    pub ammo: BTreeMap<Supply, u32>,
    pub location: Node,
    pub cycle: f64,
    #[serde(default)]
    pub escapes: u32,
    pub profit_start: i64,
    #[serde(default)]
    pub people_freed: u32,
    #[serde(default)]
    pub perks: BTreeSet<Perk>,
}

impl PlayerState {
    /// Fresh run: fixed starting values at a random node.
    pub fn new_game(dice: &mut dyn RandomSource) -> Self {
        let location = Node::ALL[dice.index(Node::ALL.len())];
        Self::starting_at(location)
    }

    pub fn starting_at(location: Node) -> Self {
        Self {
            credits: STARTING_CREDITS,
            life: MAX_VITAL,
            armor: 0,
            inventory: Warez::ALL.iter().map(|item| (*item, 0)).collect(),
            weapons: Weapon::ALL.iter().map(|weapon| (*weapon, 0)).collect(),
            ammo: Supply::ALL.iter().map(|supply| (*supply, 0)).collect(),
            location,
            cycle: STARTING_CYCLE,
            escapes: 0,
            profit_start: STARTING_CREDITS,
            people_freed: 0,
            perks: BTreeSet::new(),
        }
    }

    /// Carry credits, holdings and perks into a new cycle budget.
    pub fn start_new_game_plus(&mut self) {
        self.cycle = STARTING_CYCLE;
        self.profit_start = self.credits;
    }

    pub fn life(&self) -> i32 {
        self.life
    }

    pub fn armor(&self) -> i32 {
        self.armor
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    pub fn adjust_life(&mut self, delta: i32) {
        self.life = clamp_vital(self.life.saturating_add(delta));
    }

    pub fn adjust_armor(&mut self, delta: i32) {
        self.armor = clamp_vital(self.armor.saturating_add(delta));
    }

    pub fn set_life(&mut self, value: i32) {
        self.life = clamp_vital(value);
    }

    pub fn set_armor(&mut self, value: i32) {
        self.armor = clamp_vital(value);
    }

    pub fn warez(&self, item: Warez) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    pub fn weapon_count(&self, weapon: Weapon) -> u32 {
        self.weapons.get(&weapon).copied().unwrap_or(0)
    }

    pub fn supply(&self, supply: Supply) -> u32 {
        self.ammo.get(&supply).copied().unwrap_or(0)
    }

    pub fn add_warez(&mut self, item: Warez, quantity: u32) {
        let entry = self.inventory.entry(item).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    pub fn add_weapon(&mut self, weapon: Weapon, quantity: u32) {
        let entry = self.weapons.entry(weapon).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    pub fn add_supply(&mut self, supply: Supply, quantity: u32) {
        let entry = self.ammo.entry(supply).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Removes `quantity` units if that many are owned. Returns whether anything changed.
    pub fn take_warez(&mut self, item: Warez, quantity: u32) -> bool {
        take(self.inventory.entry(item).or_insert(0), quantity)
    }

    pub fn take_supply(&mut self, supply: Supply, quantity: u32) -> bool {
        take(self.ammo.entry(supply).or_insert(0), quantity)
    }

    pub fn has_perk(&self, perk: Perk) -> bool {
        self.perks.contains(&perk)
    }

    /// Restores the invariants a hand-edited or older save may violate:
    /// every catalog key present and vitals inside their bounds.
    pub fn normalize(&mut self) {
        for item in Warez::ALL {
            self.inventory.entry(item).or_insert(0);
        }
        for weapon in Weapon::ALL {
            self.weapons.entry(weapon).or_insert(0);
        }
        for supply in Supply::ALL {
            self.ammo.entry(supply).or_insert(0);
        }
        self.life = clamp_vital(self.life);
        self.armor = clamp_vital(self.armor);
    }
}

pub fn clamp_vital(value: i32) -> i32 {
    value.clamp(0, MAX_VITAL)
}

fn take(slot: &mut u32, quantity: u32) -> bool {
    if *slot < quantity {
        return false;
    }
    *slot -= quantity;
    true
}
