use std::fmt;

use crate::data::catalog::{Supply, Warez, Weapon};

pub const AGENT_HIT_POINTS: i32 = 50;
pub const SMITH_HIT_POINTS: i32 = 100;
pub const SMITH_DODGE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentKind {
    Agent,
    Smith,
}

impl OpponentKind {
    pub fn hit_points(self) -> i32 {
        match self {
            OpponentKind::Agent => AGENT_HIT_POINTS,
            OpponentKind::Smith => SMITH_HIT_POINTS,
        }
    }

    /// Chance the opponent sidesteps a player shot that would otherwise be rolled.
    pub fn dodge(self) -> f64 {
        match self {
            OpponentKind::Agent => 0.0,
            OpponentKind::Smith => SMITH_DODGE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OpponentKind::Agent => "AGENT",
            OpponentKind::Smith => "SMITH",
        }
    }
}

/// What the player swings or fires on a fight turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Armament {
    Weapon(Weapon),
    KungFu,
}

impl fmt::Display for Armament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Armament::Weapon(weapon) => write!(f, "{}", weapon),
            Armament::KungFu => f.write_str("Kung Fu"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatCommand {
    Fight,
    Flee,
    /// Zero-based index into the armament options shown to the player.
    Select(usize),
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatEnd {
    PlayerEscaped,
    PlayerDefeated,
    OpponentDefeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatPhase {
    ChoosingAction,
    SelectingWeapon,
    Fleeing,
    Resolving(Armament),
    Ended(CombatEnd),
}

/// A single victory drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loot {
    Warez(Warez),
    Weapon(Weapon),
    Supply(Supply),
}

impl fmt::Display for Loot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loot::Warez(item) => write!(f, "{}", item),
            Loot::Weapon(weapon) => write!(f, "{}", weapon),
            Loot::Supply(supply) => write!(f, "{}", supply),
        }
    }
}

/// Union of warez, weapons and ammunition, in catalog order.
pub fn loot_table() -> Vec<Loot> {
    Warez::ALL
        .iter()
        .map(|item| Loot::Warez(*item))
        .chain(Weapon::ALL.iter().map(|weapon| Loot::Weapon(*weapon)))
        .chain(
            Supply::ALL
                .iter()
                .filter(|supply| supply.is_ammo())
                .map(|supply| Loot::Supply(*supply)),
        )
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VictoryReward {
    pub credits: i64,
    pub loot: Loot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombatState {
    pub opponent: OpponentKind,
    pub opponent_hp: i32,
    pub phase: CombatPhase,
    pub round: u32,
    pub log: Vec<String>,
    pub reward: Option<VictoryReward>,
}

impl CombatState {
    pub fn new(opponent: OpponentKind) -> Self {
        Self {
            opponent,
            opponent_hp: opponent.hit_points(),
            phase: CombatPhase::ChoosingAction,
            round: 0,
            log: vec![format!("{} AMBUSH!", opponent.label())],
            reward: None,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, CombatPhase::Ended(_))
    }

    pub fn ended(&self) -> Option<CombatEnd> {
        match self.phase {
            CombatPhase::Ended(end) => Some(end),
            _ => None,
        }
    }

    /// Lines appended since `from`, for frontends that print incrementally.
    pub fn log_since(&self, from: usize) -> &[String] {
        &self.log[from.min(self.log.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponents_start_at_full_health() {
        let agent = CombatState::new(OpponentKind::Agent);
        assert_eq!(agent.opponent_hp, 50);
        assert_eq!(agent.phase, CombatPhase::ChoosingAction);
        let smith = CombatState::new(OpponentKind::Smith);
        assert_eq!(smith.opponent_hp, 100);
        assert!(smith.opponent.dodge() > 0.0);
    }

    #[test]
    fn loot_table_excludes_consumables() {
        let table = loot_table();
        assert_eq!(table.len(), 11);
        assert!(!table.contains(&Loot::Supply(Supply::HealthPack)));
        assert!(!table.contains(&Loot::Supply(Supply::ArmorKit)));
        assert!(table.contains(&Loot::Supply(Supply::M4Ammo)));
    }
}
