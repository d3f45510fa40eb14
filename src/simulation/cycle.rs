use std::fmt;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::simulation::perks::Perk;
use crate::simulation::player::PlayerState;

pub const CYCLE_LIMIT: f64 = 30.0;

/// Fractional cycle price of each kind of action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCost {
    Trade,
    Travel,
    Advance,
}

impl ActionCost {
    pub fn cycles(self) -> f64 {
        match self {
            ActionCost::Trade => 0.25,
            ActionCost::Travel => 0.5,
            ActionCost::Advance => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEnd {
    CycleLimit,
    Flatlined,
    Quit,
}

impl fmt::Display for RunEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunEnd::CycleLimit => "cycle budget spent",
            RunEnd::Flatlined => "flatlined",
            RunEnd::Quit => "jacked out",
        };
        f.write_str(label)
    }
}

/// Global resource holding the cycle budget for the run.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CycleClock {
    pub limit: f64,
}

impl Default for CycleClock {
    fn default() -> Self {
        Self { limit: CYCLE_LIMIT }
    }
}

impl CycleClock {
    pub fn new(limit: f64) -> Self {
        Self { limit }
    }

    pub fn charge(&self, player: &mut PlayerState, cost: ActionCost) {
        player.cycle += cost.cycles();
    }

    pub fn is_spent(&self, player: &PlayerState) -> bool {
        player.cycle > self.limit
    }

    /// Why the run must stop now, if it must.
    pub fn termination(&self, player: &PlayerState) -> Option<RunEnd> {
        if !player.is_alive() {
            Some(RunEnd::Flatlined)
        } else if self.is_spent(player) {
            Some(RunEnd::CycleLimit)
        } else {
            None
        }
    }

    /// New Game+ is offered to survivors who ran out the clock without
    /// reaching Elite Operator.
    pub fn new_game_plus_available(&self, player: &PlayerState) -> bool {
        self.is_spent(player) && player.is_alive() && !player.has_perk(Perk::EliteOperator)
    }
}
