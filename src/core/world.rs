use bevy_ecs::prelude::*;
use bevy_utils::tracing::{info, warn};

use crate::core::ecs::{create_commit_schedule, create_open_schedule, create_world};
use crate::core::rng::Dice;
use crate::error::PersistenceError;
use crate::persistence::repository::SaveRepository;
use crate::simulation::combat::{CombatCommand, CombatState, OpponentKind};
use crate::simulation::cycle::{CycleClock, RunEnd};
use crate::simulation::encounter::{EncounterKind, EncounterTable};
use crate::simulation::market::MarketPrices;
use crate::simulation::perks::{Perk, PerkLog};
use crate::simulation::player::PlayerState;
use crate::systems::actions::{apply_action, ActionOutcome, PlayerAction, RejectReason};
use crate::systems::combat_loop::{combat_step, start_combat};
use crate::systems::event_resolver::{
    apply_trace, field_medic, judge_civilian, roll_civilian_secret, roll_encounter,
    CivilianOutcome, EncounterReport,
};

/// Upper bound on combat prompts within one encounter.
const MAX_COMBAT_COMMANDS: usize = 1_000;

/// Data snapshot handed to the frontend before it picks an action.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub player: PlayerState,
    pub prices: MarketPrices,
    pub cycle_limit: f64,
}

/// Narration the engine pushes to its frontend.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EncounterStarted(EncounterKind),
    CombatLog(String),
    Encounter(EncounterReport),
    Action(ActionOutcome),
    PerkUnlocked(Perk),
}

/// The UI collaborator driving a run.
pub trait Frontend {
    /// `None` when the input could not be understood. The tick is spent as a rejected no-op.
    fn choose_action(&mut self, snapshot: &Snapshot) -> Option<PlayerAction>;
    fn choose_combat(&mut self, combat: &CombatState, player: &PlayerState) -> CombatCommand;
    /// Any integer, even outside 1-10. `None` when the answer was not a number.
    fn guess_number(&mut self) -> Option<i64>;
    fn notify(&mut self, event: &GameEvent);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub credits: i64,
    pub life: i32,
    pub armor: i32,
    pub people_freed: u32,
    pub cycle: f64,
    pub perks: Vec<Perk>,
    pub reason: RunEnd,
}

impl RunSummary {
    fn capture(player: &PlayerState, reason: RunEnd) -> Self {
        Self {
            credits: player.credits,
            life: player.life(),
            armor: player.armor(),
            people_freed: player.people_freed,
            cycle: player.cycle,
            perks: player.perks.iter().copied().collect(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    NewGame,
    Continue,
    NewGamePlus,
}

impl StartMode {
    /// Modes the start menu should offer for the given save.
    pub fn available(saved: Option<&PlayerState>, clock: &CycleClock) -> Vec<StartMode> {
        let mut modes = vec![StartMode::NewGame, StartMode::Continue];
        if saved.is_some_and(|state| clock.new_game_plus_available(state)) {
            modes.push(StartMode::NewGamePlus);
        }
        modes
    }
}

/// Wrapper around the ECS world, its schedules and the save store.
pub struct Game<S: SaveRepository> {
    world: World,
    open_schedule: Schedule,
    commit_schedule: Schedule,
    store: S,
}

impl<S: SaveRepository> Game<S> {
    pub fn new(
        player: PlayerState,
        dice: Dice,
        clock: CycleClock,
        encounters: EncounterTable,
        store: S,
    ) -> Self {
        Self {
            world: create_world(player, dice, clock, encounters),
            open_schedule: create_open_schedule(),
            commit_schedule: create_commit_schedule(),
            store,
        }
    }

    /// Build a game for the chosen start mode. Continue without a save, and
    /// New Game+ on a save that does not qualify, fall back to the nearest
    /// sensible start instead of failing.
    pub fn start(
        mode: StartMode,
        mut store: S,
        mut dice: Dice,
        clock: CycleClock,
        encounters: EncounterTable,
    ) -> Result<Self, PersistenceError> {
        let player = match mode {
            StartMode::NewGame => {
                store.clear()?;
                let player = PlayerState::new_game(dice.source());
                store.save(&player)?;
                player
            }
            StartMode::Continue => match store.load()? {
                Some(player) => player,
                None => PlayerState::new_game(dice.source()),
            },
            StartMode::NewGamePlus => match store.load()? {
                Some(mut player) if clock.new_game_plus_available(&player) => {
                    player.start_new_game_plus();
                    store.save(&player)?;
                    player
                }
                Some(player) => {
                    warn!("saved run does not qualify for New Game+; continuing it instead");
                    player
                }
                None => PlayerState::new_game(dice.source()),
            },
        };
        info!(?mode, location = %player.location, cycle = player.cycle, "run started");
        Ok(Self::new(player, dice, clock, encounters, store))
    }

    pub fn player(&self) -> &PlayerState {
        self.world.resource::<PlayerState>()
    }

    pub fn clock(&self) -> &CycleClock {
        self.world.resource::<CycleClock>()
    }

    pub fn prices(&self) -> &MarketPrices {
        self.world.resource::<MarketPrices>()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            player: self.player().clone(),
            prices: self.prices().clone(),
            cycle_limit: self.clock().limit,
        }
    }

    /// Play until the cycle budget is spent, the player flatlines or quits.
    pub fn run(&mut self, frontend: &mut dyn Frontend) -> RunSummary {
        let reason = loop {
            if let Some(end) = self.termination() {
                break end;
            }

            self.resolve_encounter(frontend);
            if !self.player().is_alive() {
                break RunEnd::Flatlined;
            }

            self.open_schedule.run(&mut self.world);
            let snapshot = self.snapshot();
            let outcome = match frontend.choose_action(&snapshot) {
                Some(action) => self.apply(action),
                None => ActionOutcome::Rejected(RejectReason::Unrecognized),
            };
            frontend.notify(&GameEvent::Action(outcome));
            self.announce_perks(frontend);

            if outcome == ActionOutcome::Quit {
                break RunEnd::Quit;
            }
            self.persist();
        };

        self.persist();
        let summary = RunSummary::capture(self.player(), reason);
        info!(
            reason = %summary.reason,
            credits = summary.credits,
            cycle = summary.cycle,
            "run finished"
        );
        summary
    }

    /// Apply one player action and, when it commits, run the commit schedule.
    /// Perks unlocked by the commit stay in the `PerkLog` until drained.
    pub fn apply(&mut self, action: PlayerAction) -> ActionOutcome {
        let outcome = self.world.resource_scope(|world, mut dice: Mut<Dice>| {
            let clock = *world.resource::<CycleClock>();
            let prices = world.resource::<MarketPrices>().clone();
            let mut player = world.resource_mut::<PlayerState>();
            apply_action(&mut player, &prices, &clock, action, dice.source())
        });
        if outcome.is_committed() {
            self.commit_schedule.run(&mut self.world);
        }
        outcome
    }

    pub fn drain_perks(&mut self) -> Vec<Perk> {
        self.world.resource_mut::<PerkLog>().drain()
    }

    fn termination(&self) -> Option<RunEnd> {
        self.clock().termination(self.player())
    }

    fn resolve_encounter(&mut self, frontend: &mut dyn Frontend) {
        let kind = self.world.resource_scope(|world, mut dice: Mut<Dice>| {
            roll_encounter(world.resource::<EncounterTable>(), dice.source())
        });
        let Some(kind) = kind else {
            return;
        };
        frontend.notify(&GameEvent::EncounterStarted(kind));

        match kind {
            EncounterKind::AgentTrace => {
                let penalty = apply_trace(&mut self.world.resource_mut::<PlayerState>());
                frontend.notify(&GameEvent::Encounter(EncounterReport::Trace { penalty }));
            }
            EncounterKind::AgentAmbush => self.fight(OpponentKind::Agent, frontend),
            EncounterKind::FieldMedic => {
                let outcome = self.world.resource_scope(|world, mut dice: Mut<Dice>| {
                    field_medic(&mut world.resource_mut::<PlayerState>(), dice.source())
                });
                frontend.notify(&GameEvent::Encounter(EncounterReport::Medic(outcome)));
            }
            EncounterKind::FreeCivilian => {
                let secret = roll_civilian_secret(self.world.resource_mut::<Dice>().source());
                let guess = frontend.guess_number();
                let outcome =
                    judge_civilian(&mut self.world.resource_mut::<PlayerState>(), secret, guess);
                frontend.notify(&GameEvent::Encounter(EncounterReport::Civilian(outcome)));
                if outcome == CivilianOutcome::Turned {
                    self.fight(OpponentKind::Smith, frontend);
                }
            }
        }

        self.commit_schedule.run(&mut self.world);
        self.announce_perks(frontend);
    }

    fn fight(&mut self, opponent: OpponentKind, frontend: &mut dyn Frontend) {
        let mut combat = start_combat(opponent);
        let mut shown = 0;
        for _ in 0..MAX_COMBAT_COMMANDS {
            shown = flush_combat_log(&combat, shown, frontend);
            if combat.is_over() {
                break;
            }
            let command = frontend.choose_combat(&combat, self.player());
            self.world.resource_scope(|world, mut dice: Mut<Dice>| {
                let mut player = world.resource_mut::<PlayerState>();
                combat_step(&mut combat, &mut player, command, dice.source());
            });
        }
        flush_combat_log(&combat, shown, frontend);

        match combat.ended() {
            Some(end) => frontend.notify(&GameEvent::Encounter(EncounterReport::Combat {
                opponent,
                end,
                reward: combat.reward,
            })),
            None => warn!(?opponent, "combat abandoned after too many commands"),
        }
    }

    fn announce_perks(&mut self, frontend: &mut dyn Frontend) {
        for perk in self.drain_perks() {
            frontend.notify(&GameEvent::PerkUnlocked(perk));
        }
    }

    fn persist(&mut self) {
        let player = self.world.resource::<PlayerState>();
        if let Err(err) = self.store.save(player) {
            warn!(%err, "failed to save run");
        }
    }
}

fn flush_combat_log(combat: &CombatState, shown: usize, frontend: &mut dyn Frontend) -> usize {
    for line in combat.log_since(shown) {
        frontend.notify(&GameEvent::CombatLog(line.clone()));
    }
    combat.log.len()
}
