use std::collections::VecDeque;

use matrix_wars::core::rng::{Dice, ScriptedDice};
use matrix_wars::core::world::{Frontend, Game, GameEvent, Snapshot};
use matrix_wars::data::catalog::{Node, Warez, Weapon};
use matrix_wars::persistence::MemorySaveStore;
use matrix_wars::simulation::combat::{CombatCommand, CombatEnd, CombatState, OpponentKind};
use matrix_wars::simulation::cycle::{CycleClock, RunEnd};
use matrix_wars::simulation::encounter::{EncounterKind, EncounterTable};
use matrix_wars::simulation::perks::Perk;
use matrix_wars::simulation::player::PlayerState;
use matrix_wars::systems::actions::{ActionOutcome, PlayerAction, RejectReason};
use matrix_wars::systems::event_resolver::{CivilianOutcome, EncounterReport};

/// Replays queued inputs and records everything the engine reports.
#[derive(Default)]
struct ScriptedFrontend {
    actions: VecDeque<Option<PlayerAction>>,
    combat: VecDeque<CombatCommand>,
    guesses: VecDeque<Option<i64>>,
    snapshots: Vec<Snapshot>,
    events: Vec<GameEvent>,
}

impl ScriptedFrontend {
    fn with_actions(actions: impl IntoIterator<Item = Option<PlayerAction>>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            ..Self::default()
        }
    }

    fn encounters(&self) -> Vec<EncounterKind> {
        self.events
            .iter()
            .filter_map(|event| match event {
                GameEvent::EncounterStarted(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    fn reports(&self) -> Vec<EncounterReport> {
        self.events
            .iter()
            .filter_map(|event| match event {
                GameEvent::Encounter(report) => Some(report.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Frontend for ScriptedFrontend {
    fn choose_action(&mut self, snapshot: &Snapshot) -> Option<PlayerAction> {
        self.snapshots.push(snapshot.clone());
        self.actions.pop_front().unwrap_or(Some(PlayerAction::Quit))
    }

    fn choose_combat(&mut self, _combat: &CombatState, _player: &PlayerState) -> CombatCommand {
        self.combat.pop_front().unwrap_or(CombatCommand::Flee)
    }

    fn guess_number(&mut self) -> Option<i64> {
        self.guesses.pop_front().flatten()
    }

    fn notify(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}

fn game(player: PlayerState, dice: ScriptedDice) -> Game<MemorySaveStore> {
    Game::new(
        player,
        Dice::new(dice),
        CycleClock::default(),
        EncounterTable::default(),
        MemorySaveStore::default(),
    )
}

#[test]
fn advancing_past_the_limit_ends_before_another_roll() {
    let mut player = PlayerState::starting_at(Node::Construct);
    player.cycle = 29.8;
    // A second encounter roll would draw the trace.
    let mut game = game(player, ScriptedDice::new().with_units([0.99, 0.05]));
    let mut frontend = ScriptedFrontend::with_actions([Some(PlayerAction::Advance)]);

    let summary = game.run(&mut frontend);

    assert_eq!(summary.reason, RunEnd::CycleLimit);
    assert!((summary.cycle - 30.8).abs() < 1e-9);
    assert_eq!(summary.credits, 2_000);
    assert!(frontend.encounters().is_empty());
    assert_eq!(frontend.snapshots.len(), 1);
}

#[test]
fn trace_then_quit_persists_the_penalty() {
    let mut game = game(
        PlayerState::starting_at(Node::Construct),
        ScriptedDice::new().with_units([0.05]),
    );
    let mut frontend = ScriptedFrontend::with_actions([Some(PlayerAction::Quit)]);

    let summary = game.run(&mut frontend);

    assert_eq!(summary.reason, RunEnd::Quit);
    assert_eq!(summary.credits, 1_600);
    assert_eq!(
        frontend.reports(),
        vec![EncounterReport::Trace { penalty: 400 }]
    );
    assert_eq!(game.store().state().map(|state| state.credits), Some(1_600));
}

#[test]
fn rejected_input_spends_the_tick_without_mutation() {
    let start = PlayerState::starting_at(Node::Trainstation);
    let mut game = game(start.clone(), ScriptedDice::new());
    let mut frontend = ScriptedFrontend::with_actions([
        None,
        Some(PlayerAction::Download {
            item: Warez::RootKit,
            quantity: 1,
        }),
        Some(PlayerAction::Upload {
            item: Warez::Worm,
            quantity: 1,
        }),
    ]);

    let summary = game.run(&mut frontend);

    let outcomes: Vec<ActionOutcome> = frontend
        .events
        .iter()
        .filter_map(|event| match event {
            GameEvent::Action(outcome) => Some(*outcome),
            _ => None,
        })
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ActionOutcome::Rejected(RejectReason::Unrecognized),
            ActionOutcome::Rejected(RejectReason::InsufficientCredits),
            ActionOutcome::Rejected(RejectReason::InsufficientStock),
            ActionOutcome::Quit,
        ]
    );
    assert_eq!(summary.reason, RunEnd::Quit);
    assert_eq!(game.player(), &start);
}

#[test]
fn download_uses_the_price_shown_that_tick() {
    let mut game = game(
        PlayerState::starting_at(Node::Construct),
        ScriptedDice::new().with_ints([20_000, 5_000, 500, 2_000, 40]),
    );
    let mut frontend = ScriptedFrontend::with_actions([Some(PlayerAction::Download {
        item: Warez::Datashard,
        quantity: 2,
    })]);

    game.run(&mut frontend);

    assert_eq!(frontend.snapshots[0].prices.price(Warez::Datashard), Some(500));
    let player = game.player();
    assert_eq!(player.credits, 1_000);
    assert_eq!(player.warez(Warez::Datashard), 2);
    assert_eq!(player.cycle, 1.25);
}

#[test]
fn failed_flee_at_low_life_flatlines_the_run() {
    let mut player = PlayerState::starting_at(Node::Construct);
    player.set_life(10);
    let mut game = game(player, ScriptedDice::new().with_units([0.2, 0.9]));
    let mut frontend = ScriptedFrontend::default();
    frontend.combat.push_back(CombatCommand::Flee);

    let summary = game.run(&mut frontend);

    assert_eq!(summary.reason, RunEnd::Flatlined);
    assert_eq!(summary.life, 0);
    assert!(frontend.snapshots.is_empty());
    assert!(matches!(
        frontend.reports().as_slice(),
        [EncounterReport::Combat {
            opponent: OpponentKind::Agent,
            end: CombatEnd::PlayerDefeated,
            ..
        }]
    ));
    assert_eq!(game.store().state().map(|state| state.life()), Some(0));
}

#[test]
fn close_guess_frees_a_civilian() {
    let mut game = game(
        PlayerState::starting_at(Node::Oracle),
        ScriptedDice::new().with_units([0.42]).with_ints([5]),
    );
    let mut frontend = ScriptedFrontend::default();
    frontend.guesses.push_back(Some(6));

    let summary = game.run(&mut frontend);

    assert_eq!(summary.people_freed, 1);
    assert_eq!(
        frontend.reports(),
        vec![EncounterReport::Civilian(CivilianOutcome::Freed)]
    );
}

#[test]
fn wrong_guess_escalates_to_smith() {
    let mut game = game(
        PlayerState::starting_at(Node::Oracle),
        ScriptedDice::new().with_units([0.42, 0.1]).with_ints([5]),
    );
    let mut frontend = ScriptedFrontend::default();
    frontend.guesses.push_back(Some(10));
    frontend.combat.push_back(CombatCommand::Flee);

    let summary = game.run(&mut frontend);

    assert_eq!(summary.people_freed, 0);
    assert_eq!(game.player().escapes, 1);
    let reports = frontend.reports();
    assert_eq!(reports[0], EncounterReport::Civilian(CivilianOutcome::Turned));
    assert!(matches!(
        reports[1],
        EncounterReport::Combat {
            opponent: OpponentKind::Smith,
            end: CombatEnd::PlayerEscaped,
            ..
        }
    ));
}

#[test]
fn out_of_range_guess_is_still_a_wrong_number() {
    let mut game = game(
        PlayerState::starting_at(Node::Oracle),
        ScriptedDice::new().with_units([0.42, 0.1]).with_ints([5]),
    );
    let mut frontend = ScriptedFrontend::default();
    frontend.guesses.push_back(Some(-1));
    frontend.combat.push_back(CombatCommand::Flee);

    game.run(&mut frontend);

    let reports = frontend.reports();
    assert_eq!(reports[0], EncounterReport::Civilian(CivilianOutcome::Turned));
    assert!(matches!(
        reports[1],
        EncounterReport::Combat {
            opponent: OpponentKind::Smith,
            ..
        }
    ));
}

#[test]
fn backing_out_of_every_prompt_abandons_the_fight_unharmed() {
    let mut game = game(
        PlayerState::starting_at(Node::Construct),
        ScriptedDice::new().with_units([0.2]),
    );
    let mut frontend = ScriptedFrontend::default();
    frontend
        .combat
        .extend(std::iter::repeat(CombatCommand::Back).take(1_000));

    let summary = game.run(&mut frontend);

    assert_eq!(summary.reason, RunEnd::Quit);
    assert_eq!(summary.life, 100);
    assert_eq!(game.player().escapes, 0);
    assert!(frontend.combat.is_empty());
    assert!(frontend.reports().is_empty());
    assert_eq!(frontend.snapshots.len(), 1);
}

#[test]
fn completing_the_armory_announces_heavily_armed() {
    let mut player = PlayerState::starting_at(Node::Construct);
    player.credits = 10_000;
    player.profit_start = 10_000;
    player.add_weapon(Weapon::Beretta, 1);
    player.add_weapon(Weapon::Mp5k, 1);
    let mut game = game(player, ScriptedDice::new());
    let mut frontend = ScriptedFrontend::with_actions([Some(PlayerAction::BuyWeapon {
        weapon: Weapon::M4Carbine,
        quantity: 1,
    })]);

    let summary = game.run(&mut frontend);

    assert!(frontend
        .events
        .contains(&GameEvent::PerkUnlocked(Perk::HeavilyArmed)));
    assert_eq!(summary.perks, vec![Perk::HeavilyArmed]);
    assert_eq!(summary.credits, 2_000);
}
