use std::fmt;

use bevy_utils::tracing::debug;

use crate::core::rng::RandomSource;
use crate::data::catalog::{Node, Supply, SupplyEffect, Warez, Weapon};
use crate::simulation::cycle::{ActionCost, CycleClock};
use crate::simulation::market::MarketPrices;
use crate::simulation::perks::Perk;
use crate::simulation::player::PlayerState;

/// Sale bonus for Data Brokers, as a fraction of the table price.
pub const DATA_BROKER_BONUS: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Download { item: Warez, quantity: u32 },
    Upload { item: Warez, quantity: u32 },
    BuyWeapon { weapon: Weapon, quantity: u32 },
    BuySupply { supply: Supply, quantity: u32 },
    Equip { supply: Supply },
    Travel,
    Advance,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Unrecognized,
    ZeroQuantity,
    InsufficientCredits,
    InsufficientStock,
    NotEquippable,
    NoPrice,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RejectReason::Unrecognized => "unrecognized command",
            RejectReason::ZeroQuantity => "quantity must be at least 1",
            RejectReason::InsufficientCredits => "not enough credits",
            RejectReason::InsufficientStock => "not enough in stock",
            RejectReason::NotEquippable => "that item cannot be equipped",
            RejectReason::NoPrice => "no market price for that item",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionOutcome {
    Committed { action: PlayerAction, cycles: f64 },
    Rejected(RejectReason),
    Quit,
}

impl ActionOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, ActionOutcome::Committed { .. })
    }
}

/// Applies one player action. Every rejection happens before any mutation.
pub fn apply_action(
    player: &mut PlayerState,
    prices: &MarketPrices,
    clock: &CycleClock,
    action: PlayerAction,
    dice: &mut dyn RandomSource,
) -> ActionOutcome {
    let cost = match action {
        PlayerAction::Quit => return ActionOutcome::Quit,
        PlayerAction::Download { item, quantity } => download(player, prices, item, quantity),
        PlayerAction::Upload { item, quantity } => upload(player, prices, item, quantity),
        PlayerAction::BuyWeapon { weapon, quantity } => buy_weapon(player, weapon, quantity),
        PlayerAction::BuySupply { supply, quantity } => buy_supply(player, supply, quantity),
        PlayerAction::Equip { supply } => equip(player, supply),
        PlayerAction::Travel => {
            player.location = Node::ALL[dice.index(Node::ALL.len())];
            Ok(ActionCost::Travel)
        }
        PlayerAction::Advance => Ok(ActionCost::Advance),
    };

    match cost {
        Ok(cost) => {
            clock.charge(player, cost);
            debug!(?action, cycle = player.cycle, credits = player.credits, "action committed");
            ActionOutcome::Committed {
                action,
                cycles: cost.cycles(),
            }
        }
        Err(reason) => {
            debug!(?action, %reason, "action rejected");
            ActionOutcome::Rejected(reason)
        }
    }
}

fn total_cost(unit_price: i64, quantity: u32) -> Result<i64, RejectReason> {
    if quantity == 0 {
        return Err(RejectReason::ZeroQuantity);
    }
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or(RejectReason::InsufficientCredits)
}

fn spend(player: &mut PlayerState, total: i64) -> Result<(), RejectReason> {
    if total > player.credits {
        return Err(RejectReason::InsufficientCredits);
    }
    player.credits -= total;
    Ok(())
}

fn download(
    player: &mut PlayerState,
    prices: &MarketPrices,
    item: Warez,
    quantity: u32,
) -> Result<ActionCost, RejectReason> {
    let price = prices.price(item).ok_or(RejectReason::NoPrice)?;
    let total = total_cost(price, quantity)?;
    spend(player, total)?;
    player.add_warez(item, quantity);
    Ok(ActionCost::Trade)
}

fn upload(
    player: &mut PlayerState,
    prices: &MarketPrices,
    item: Warez,
    quantity: u32,
) -> Result<ActionCost, RejectReason> {
    let price = prices.price(item).ok_or(RejectReason::NoPrice)?;
    let mut total = total_cost(price, quantity)?;
    if player.has_perk(Perk::DataBroker) {
        total += (total as f64 * DATA_BROKER_BONUS).floor() as i64;
    }
    if !player.take_warez(item, quantity) {
        return Err(RejectReason::InsufficientStock);
    }
    player.credits += total;
    Ok(ActionCost::Trade)
}

fn buy_weapon(
    player: &mut PlayerState,
    weapon: Weapon,
    quantity: u32,
) -> Result<ActionCost, RejectReason> {
    let stats = weapon.stats();
    let total = total_cost(stats.price, quantity)?;
    spend(player, total)?;
    player.add_weapon(weapon, quantity);
    player.add_supply(stats.ammo, stats.magazine.saturating_mul(quantity));
    Ok(ActionCost::Trade)
}

fn buy_supply(
    player: &mut PlayerState,
    supply: Supply,
    quantity: u32,
) -> Result<ActionCost, RejectReason> {
    let total = total_cost(supply.price(), quantity)?;
    spend(player, total)?;
    player.add_supply(supply, quantity);
    Ok(ActionCost::Trade)
}

fn equip(player: &mut PlayerState, supply: Supply) -> Result<ActionCost, RejectReason> {
    let effect = supply.effect().ok_or(RejectReason::NotEquippable)?;
    if !player.take_supply(supply, 1) {
        return Err(RejectReason::InsufficientStock);
    }
    match effect {
        SupplyEffect::Heal(amount) => player.adjust_life(amount),
        SupplyEffect::Shield(amount) => player.adjust_armor(amount),
    }
    Ok(ActionCost::Trade)
}
