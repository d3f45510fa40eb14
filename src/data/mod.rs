pub mod catalog;

pub use catalog::{Node, Supply, SupplyEffect, Warez, Weapon, WeaponStats};
