use std::collections::BTreeMap;

use bevy_ecs::prelude::*;

use crate::core::rng::RandomSource;
use crate::data::catalog::{Node, Warez};

/// Today's warez prices. Buying and selling both read this table.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketPrices(pub BTreeMap<Warez, i64>);

impl MarketPrices {
    pub fn price(&self, item: Warez) -> Option<i64> {
        self.0.get(&item).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Warez, i64)> + '_ {
        self.0.iter().map(|(item, price)| (*item, *price))
    }
}

/// `floor(base * multiplier)` for a base roll.
pub fn scaled_price(base: i64, multiplier: f64) -> i64 {
    (base as f64 * multiplier).floor() as i64
}

/// The inclusive band every price for `item` at `node` falls in.
pub fn price_bounds(item: Warez, node: Node) -> (i64, i64) {
    let (min, max) = item.price_range();
    let multiplier = node.price_multiplier();
    (scaled_price(min, multiplier), scaled_price(max, multiplier))
}

pub fn roll_price(item: Warez, node: Node, dice: &mut dyn RandomSource) -> i64 {
    let (min, max) = item.price_range();
    scaled_price(dice.between(min, max), node.price_multiplier())
}

/// Rolls one price per catalog item, in catalog order.
pub fn roll_prices(node: Node, dice: &mut dyn RandomSource) -> MarketPrices {
    MarketPrices(
        Warez::ALL
            .iter()
            .map(|item| (*item, roll_price(*item, node, dice)))
            .collect(),
    )
}
