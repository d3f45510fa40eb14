use std::fmt;

use serde::{Deserialize, Serialize};

/// A node of the grid. Each node scales market rolls by its own multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Node {
    Trainstation,
    Construct,
    Nebuchadnezzar,
    Oracle,
    Chateau,
}

impl Node {
    pub const ALL: [Node; 5] = [
        Node::Trainstation,
        Node::Construct,
        Node::Nebuchadnezzar,
        Node::Oracle,
        Node::Chateau,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Node::Trainstation => "Trainstation",
            Node::Construct => "Construct",
            Node::Nebuchadnezzar => "Nebuchadnezzar",
            Node::Oracle => "Oracle",
            Node::Chateau => "Chateau",
        }
    }

    pub fn price_multiplier(self) -> f64 {
        match self {
            Node::Trainstation => 0.9,
            Node::Construct => 1.0,
            Node::Nebuchadnezzar => 1.2,
            Node::Oracle => 1.1,
            Node::Chateau => 1.3,
        }
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        lookup(&Self::ALL, raw, |node| node.name())
    }
}

/// Tradeable contraband.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Warez {
    RootKit,
    #[serde(rename = "BlackICE")]
    BlackIce,
    Datashard,
    Trojan,
    Worm,
}

impl Warez {
    pub const ALL: [Warez; 5] = [
        Warez::RootKit,
        Warez::BlackIce,
        Warez::Datashard,
        Warez::Trojan,
        Warez::Worm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Warez::RootKit => "RootKit",
            Warez::BlackIce => "BlackICE",
            Warez::Datashard => "Datashard",
            Warez::Trojan => "Trojan",
            Warez::Worm => "Worm",
        }
    }

    /// Inclusive (min, max) base price before the node multiplier.
    pub fn price_range(self) -> (i64, i64) {
        match self {
            Warez::RootKit => (15_000, 28_000),
            Warez::BlackIce => (2_000, 10_000),
            Warez::Datashard => (300, 1_000),
            Warez::Trojan => (1_000, 4_200),
            Warez::Worm => (18, 75),
        }
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        lookup(&Self::ALL, raw, |item| item.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub price: i64,
    pub accuracy: f64,
    pub damage: i32,
    pub ammo: Supply,
    pub magazine: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weapon {
    #[serde(rename = "Beretta 92FS")]
    Beretta,
    #[serde(rename = "MP5K SMG")]
    Mp5k,
    #[serde(rename = "M4 Carbine")]
    M4Carbine,
}

impl Weapon {
    pub const ALL: [Weapon; 3] = [Weapon::Beretta, Weapon::Mp5k, Weapon::M4Carbine];

    pub fn name(self) -> &'static str {
        match self {
            Weapon::Beretta => "Beretta 92FS",
            Weapon::Mp5k => "MP5K SMG",
            Weapon::M4Carbine => "M4 Carbine",
        }
    }

    pub fn stats(self) -> WeaponStats {
        match self {
            Weapon::Beretta => WeaponStats {
                price: 2_000,
                accuracy: 0.70,
                damage: 15,
                ammo: Supply::BerettaAmmo,
                magazine: 18,
            },
            Weapon::Mp5k => WeaponStats {
                price: 5_000,
                accuracy: 0.50,
                damage: 20,
                ammo: Supply::Mp5kAmmo,
                magazine: 40,
            },
            Weapon::M4Carbine => WeaponStats {
                price: 8_000,
                accuracy: 0.60,
                damage: 25,
                ammo: Supply::M4Ammo,
                magazine: 30,
            },
        }
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        lookup(&Self::ALL, raw, |weapon| weapon.name())
    }
}

/// What equipping a consumable does to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyEffect {
    Heal(i32),
    Shield(i32),
}

/// Ammunition and consumables sold by the armory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Supply {
    #[serde(rename = "Beretta Ammo")]
    BerettaAmmo,
    #[serde(rename = "MP5K Ammo")]
    Mp5kAmmo,
    #[serde(rename = "M4 Ammo")]
    M4Ammo,
    #[serde(rename = "Health Pack")]
    HealthPack,
    #[serde(rename = "Armor Kit")]
    ArmorKit,
}

impl Supply {
    pub const ALL: [Supply; 5] = [
        Supply::BerettaAmmo,
        Supply::Mp5kAmmo,
        Supply::M4Ammo,
        Supply::HealthPack,
        Supply::ArmorKit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Supply::BerettaAmmo => "Beretta Ammo",
            Supply::Mp5kAmmo => "MP5K Ammo",
            Supply::M4Ammo => "M4 Ammo",
            Supply::HealthPack => "Health Pack",
            Supply::ArmorKit => "Armor Kit",
        }
    }

    pub fn price(self) -> i64 {
        match self {
            Supply::BerettaAmmo => 5,
            Supply::Mp5kAmmo => 3,
            Supply::M4Ammo => 7,
            Supply::HealthPack => 50,
            Supply::ArmorKit => 100,
        }
    }

    /// `None` for ammunition, which can only be spent in combat.
    pub fn effect(self) -> Option<SupplyEffect> {
        match self {
            Supply::HealthPack => Some(SupplyEffect::Heal(15)),
            Supply::ArmorKit => Some(SupplyEffect::Shield(20)),
            Supply::BerettaAmmo | Supply::Mp5kAmmo | Supply::M4Ammo => None,
        }
    }

    pub fn is_ammo(self) -> bool {
        self.effect().is_none()
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        lookup(&Self::ALL, raw, |supply| supply.name())
    }
}

fn lookup<T: Copy>(all: &[T], raw: &str, name: impl Fn(T) -> &'static str) -> Option<T> {
    let needle = raw.trim();
    all.iter()
        .copied()
        .find(|item| name(*item).eq_ignore_ascii_case(needle))
}

macro_rules! display_by_name {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        })*
    };
}

display_by_name!(Node, Warez, Weapon, Supply);
