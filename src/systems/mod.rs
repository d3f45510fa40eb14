pub mod actions;
pub mod combat_loop;
pub mod event_resolver;

use bevy_ecs::prelude::*;
use bevy_utils::tracing::info;

use crate::core::rng::Dice;
use crate::simulation::market::{roll_prices, MarketPrices};
use crate::simulation::perks::{evaluate_perks, PerkLog};
use crate::simulation::player::PlayerState;

/// Re-rolls the price table for the node the player is standing in.
pub fn market_system(
    player: Res<PlayerState>,
    mut dice: ResMut<Dice>,
    mut prices: ResMut<MarketPrices>,
) {
    *prices = roll_prices(player.location, dice.source());
}

/// Pulls vitals back inside their bounds after anything wrote them.
pub fn vitals_system(mut player: ResMut<PlayerState>) {
    let (life, armor) = (player.life(), player.armor());
    player.set_life(life);
    player.set_armor(armor);
}

pub fn perk_system(mut player: ResMut<PlayerState>, mut log: ResMut<PerkLog>) {
    for perk in evaluate_perks(&mut player) {
        info!(%perk, "perk unlocked");
        log.0.push(perk);
    }
}
