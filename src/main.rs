use std::env;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use matrix_wars::core::config::{EngineConfig, StoreBackend};
use matrix_wars::core::rng::Dice;
use matrix_wars::core::world::{Frontend, Game, GameEvent, RunSummary, Snapshot, StartMode};
use matrix_wars::data::catalog::{Supply, Warez, Weapon};
use matrix_wars::error::PersistenceError;
use matrix_wars::persistence::{JsonSaveFile, SaveRepository, SqliteSaveStore};
use matrix_wars::simulation::combat::{CombatCommand, CombatPhase, CombatState};
use matrix_wars::simulation::cycle::CycleClock;
use matrix_wars::simulation::encounter::EncounterTable;
use matrix_wars::simulation::player::PlayerState;
use matrix_wars::systems::actions::{ActionOutcome, PlayerAction};
use matrix_wars::systems::combat_loop::armament_options;

const TITLE: &str = r#"
 __  __    _  _____ ____  _____  __  __        ___    ____  ____
|  \/  |  / \|_   _|  _ \|_ _\ \/ /  \ \      / / \  |  _ \/ ___|
| |\/| | / _ \ | | | |_) || | \  /    \ \ /\ / / _ \ | |_) \___ \
| |  | |/ ___ \| | |  _ < | | /  \     \ V  V / ___ \|  _ < ___) |
|_|  |_/_/   \_\_| |_| \_\___/_/\_\     \_/\_/_/   \_\_| \_\____/
"#;

const STORY: &str = "
In a world enslaved by the Matrix, you are a rogue operator.
Your mission: infiltrate nodes, trade digital contraband,
evade Agents, and amass credits to free humanity.
";

const INSTRUCTIONS: &str = "
Instructions:
- [D]ownload: buy programs at today's price.
- [U]pload: sell contraband at today's price.
- [W]eapons: purchase arms, ammo and consumables.
- [E]quip: use a Health Pack or Armor Kit.
- [J]ack In: travel to a random node (0.5 cycle).
- [N]ext: advance one cycle.
- [Q]uit: save and return to the menu.
Trades and purchases cost 0.25 cycle. The run ends after the cycle budget or at 0% life.
";

const ACKNOWLEDGMENTS: &str = "
Acknowledgments:
- Yellow Tail Tech
- Boot.dev
- Sophos Cohort
- John E. Dell
- Beta Testers
- The Matrix.
";

const CONSUMABLES: [Supply; 2] = [Supply::HealthPack, Supply::ArmorKit];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match EngineConfig::from_args(env::args()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Usage: matrix-wars [--save <path>] [--store json|sqlite] [--cycles <n>] [--pace <ms>]");
            std::process::exit(2);
        }
    };

    let mut console = Console::new(config.pace);
    loop {
        println!("{}", TITLE);
        println!("1) Enter the Matrix");
        println!("2) View Story");
        println!("3) How to Play");
        println!("4) Acknowledgments");
        println!("5) Exit");
        let Some(choice) = console.prompt("Select: ") else {
            break;
        };
        match choice.as_str() {
            "1" => start_menu(&config, &mut console),
            "2" => console.page(STORY),
            "3" => console.page(INSTRUCTIONS),
            "4" => console.page(ACKNOWLEDGMENTS),
            "5" => break,
            _ => println!("Invalid selection."),
        }
    }
}

fn open_store(config: &EngineConfig) -> Result<Box<dyn SaveRepository>, PersistenceError> {
    Ok(match config.backend {
        StoreBackend::Json => Box::new(JsonSaveFile::new(&config.save_path)),
        StoreBackend::Sqlite => Box::new(SqliteSaveStore::open(&config.save_path)?),
    })
}

fn start_menu(config: &EngineConfig, console: &mut Console) {
    let mut store = match open_store(config) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Failed to open save store {}: {}", config.save_path.display(), err);
            return;
        }
    };
    let clock = CycleClock::new(config.cycle_limit);
    let saved = match store.load() {
        Ok(saved) => saved,
        Err(err) => {
            eprintln!("Failed to read save: {}", err);
            None
        }
    };
    let modes = StartMode::available(saved.as_ref(), &clock);

    println!("\n=== MATRIX WARS START ===");
    for (idx, mode) in modes.iter().enumerate() {
        let label = match mode {
            StartMode::NewGame => "New Game",
            StartMode::Continue => "Continue",
            StartMode::NewGamePlus => "New Game+ (keep your inventory)",
        };
        println!("{}) {}", idx + 1, label);
    }
    println!("{}) Back to Main Menu", modes.len() + 1);
    let Some(choice) = console.prompt("Select: ") else {
        return;
    };
    let Some(mode) = pick(&choice, &modes, |_| "") else {
        return;
    };

    let game = Game::start(
        mode,
        store,
        Dice::entropy(),
        clock,
        EncounterTable::default(),
    );
    let mut game = match game {
        Ok(game) => game,
        Err(err) => {
            eprintln!("Failed to start run: {}", err);
            return;
        }
    };
    let summary = game.run(console);
    print_summary(&summary);
    console.page("");
}

fn print_summary(summary: &RunSummary) {
    println!("\n=== SIMULATION COMPLETE ({}) ===", summary.reason);
    println!("Credits: {}", summary.credits);
    println!(
        "Life: {}%  Armor: {}%  Freed: {}",
        summary.life, summary.armor, summary.people_freed
    );
    if !summary.perks.is_empty() {
        let perks: Vec<String> = summary.perks.iter().map(|perk| perk.to_string()).collect();
        println!("Perks: {}", perks.join(", "));
    }
}

/// Line-oriented terminal frontend.
struct Console {
    pace: Duration,
    lines: io::Lines<io::StdinLock<'static>>,
}

impl Console {
    fn new(pace: Duration) -> Self {
        Self {
            pace,
            lines: io::stdin().lock().lines(),
        }
    }

    /// `None` on end of input.
    fn prompt(&mut self, label: &str) -> Option<String> {
        print!("{}", label);
        let _ = io::stdout().flush();
        match self.lines.next() {
            Some(Ok(line)) => Some(line.trim().to_string()),
            _ => None,
        }
    }

    fn page(&mut self, text: &str) {
        println!("{}", text);
        let _ = self.prompt("Press Enter...");
    }

    fn pause(&self) {
        if !self.pace.is_zero() {
            thread::sleep(self.pace);
        }
    }

    fn choose_from<T: Copy>(
        &mut self,
        title: &str,
        options: &[T],
        label: impl Fn(T) -> String,
        name: impl Fn(T) -> &'static str,
    ) -> Option<T> {
        println!("{}", title);
        for (idx, option) in options.iter().enumerate() {
            println!("  {}. {}", idx + 1, label(*option));
        }
        let raw = self.prompt("Choice: ")?;
        pick(&raw, options, name)
    }

    fn quantity(&mut self) -> Option<u32> {
        parse_quantity(&self.prompt("Qty? ")?)
    }
}

impl Frontend for Console {
    fn choose_action(&mut self, snapshot: &Snapshot) -> Option<PlayerAction> {
        render(snapshot);
        let Some(key) = self.prompt("[D]ownload [U]pload [W]eapons [E]quip [J]ack In [N]ext [Q]uit: ")
        else {
            return Some(PlayerAction::Quit);
        };
        match key.to_ascii_uppercase().as_str() {
            "D" => {
                let item = self.choose_from(
                    "Download which?",
                    &Warez::ALL,
                    |item| format!("{} - {}cr", item, snapshot.prices.price(item).unwrap_or(0)),
                    Warez::name,
                )?;
                let quantity = self.quantity()?;
                Some(PlayerAction::Download { item, quantity })
            }
            "U" => {
                let item = self.choose_from(
                    "Upload which?",
                    &Warez::ALL,
                    |item| format!("{} (owned {})", item, snapshot.player.warez(item)),
                    Warez::name,
                )?;
                let quantity = self.quantity()?;
                Some(PlayerAction::Upload { item, quantity })
            }
            "W" => {
                let entries = armory_entries();
                let entry = self.choose_from(
                    "Armory:",
                    &entries,
                    |entry| match entry {
                        ArmoryEntry::Weapon(weapon) => {
                            let stats = weapon.stats();
                            format!(
                                "{} - {}cr (acc {:.0}%, dmg {}, +{} {})",
                                weapon,
                                stats.price,
                                stats.accuracy * 100.0,
                                stats.damage,
                                stats.magazine,
                                stats.ammo
                            )
                        }
                        ArmoryEntry::Supply(supply) => format!("{} - {}cr", supply, supply.price()),
                    },
                    ArmoryEntry::name,
                )?;
                let quantity = self.quantity()?;
                Some(match entry {
                    ArmoryEntry::Weapon(weapon) => PlayerAction::BuyWeapon { weapon, quantity },
                    ArmoryEntry::Supply(supply) => PlayerAction::BuySupply { supply, quantity },
                })
            }
            "E" => {
                let supply = self.choose_from(
                    "Equip which?",
                    &CONSUMABLES,
                    |supply| format!("{} (owned {})", supply, snapshot.player.supply(supply)),
                    Supply::name,
                )?;
                Some(PlayerAction::Equip { supply })
            }
            "J" => Some(PlayerAction::Travel),
            "N" => Some(PlayerAction::Advance),
            "Q" => Some(PlayerAction::Quit),
            _ => None,
        }
    }

    fn choose_combat(&mut self, combat: &CombatState, player: &PlayerState) -> CombatCommand {
        println!(
            "\n{} HP {} | Life {}% Armor {}%",
            combat.opponent.label(),
            combat.opponent_hp,
            player.life(),
            player.armor()
        );
        if combat.phase == CombatPhase::SelectingWeapon {
            for (idx, armament) in armament_options(player).iter().enumerate() {
                println!("  {}. {}", idx + 1, armament);
            }
            println!("  B) Back");
        }
        let label = match combat.phase {
            CombatPhase::SelectingWeapon => "Weapon: ",
            _ => "[F]ight or [R]un: ",
        };
        let raw = self.prompt(label);
        combat_command(combat.phase, raw.as_deref())
    }

    fn guess_number(&mut self) -> Option<i64> {
        parse_guess(&self.prompt("Pick a number 1-10: ")?)
    }

    fn notify(&mut self, event: &GameEvent) {
        match event {
            GameEvent::EncounterStarted(kind) => {
                println!("\n*** {} ***", kind.to_string().to_uppercase());
                self.pause();
            }
            GameEvent::CombatLog(line) => println!("{}", line),
            GameEvent::Encounter(report) => {
                println!("{}", report);
                self.pause();
            }
            GameEvent::Action(ActionOutcome::Rejected(reason)) => println!("Rejected: {}", reason),
            GameEvent::Action(_) => {}
            GameEvent::PerkUnlocked(perk) => {
                println!("PERK UNLOCKED: {} ({})", perk, perk.blurb());
                self.pause();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArmoryEntry {
    Weapon(Weapon),
    Supply(Supply),
}

impl ArmoryEntry {
    fn name(self) -> &'static str {
        match self {
            ArmoryEntry::Weapon(weapon) => weapon.name(),
            ArmoryEntry::Supply(supply) => supply.name(),
        }
    }
}

fn armory_entries() -> Vec<ArmoryEntry> {
    Weapon::ALL
        .iter()
        .map(|weapon| ArmoryEntry::Weapon(*weapon))
        .chain(Supply::ALL.iter().map(|supply| ArmoryEntry::Supply(*supply)))
        .collect()
}

fn render(snapshot: &Snapshot) {
    let player = &snapshot.player;
    println!(
        "\n[{}] Cyc {:.2}/{:.1} | Credits {} | Life {}% | Armor {}% | Freed {}",
        player.location,
        player.cycle,
        snapshot.cycle_limit,
        player.credits,
        player.life(),
        player.armor(),
        player.people_freed
    );
    println!("Market:");
    for (item, price) in snapshot.prices.iter() {
        println!("  {:<10} {:>6}cr  owned {}", item.to_string(), price, player.warez(item));
    }
    let arms: Vec<String> = Weapon::ALL
        .iter()
        .filter(|weapon| player.weapon_count(**weapon) > 0)
        .map(|weapon| format!("{} x{}", weapon, player.weapon_count(*weapon)))
        .collect();
    if !arms.is_empty() {
        println!("Weapons: {}", arms.join(", "));
    }
    let supplies: Vec<String> = Supply::ALL
        .iter()
        .filter(|supply| player.supply(**supply) > 0)
        .map(|supply| format!("{} x{}", supply, player.supply(*supply)))
        .collect();
    if !supplies.is_empty() {
        println!("Supplies: {}", supplies.join(", "));
    }
    if !player.perks.is_empty() {
        let perks: Vec<String> = player.perks.iter().map(|perk| perk.to_string()).collect();
        println!("Perks: {}", perks.join(", "));
    }
}

/// Accepts a 1-based menu index or an item name, case-insensitively.
fn pick<T: Copy>(raw: &str, options: &[T], name: impl Fn(T) -> &'static str) -> Option<T> {
    let raw = raw.trim();
    if let Ok(idx) = raw.parse::<usize>() {
        return idx.checked_sub(1).and_then(|idx| options.get(idx).copied());
    }
    options
        .iter()
        .copied()
        .find(|option| !raw.is_empty() && name(*option).eq_ignore_ascii_case(raw))
}

fn parse_quantity(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

fn parse_guess(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Closed input and unknown keys both map to `Back`, which changes nothing
/// while choosing an action.
fn combat_command(phase: CombatPhase, raw: Option<&str>) -> CombatCommand {
    raw.and_then(|raw| parse_combat(phase, raw)).unwrap_or(CombatCommand::Back)
}

fn parse_combat(phase: CombatPhase, raw: &str) -> Option<CombatCommand> {
    let raw = raw.trim();
    match phase {
        CombatPhase::SelectingWeapon => {
            if raw.eq_ignore_ascii_case("b") {
                return Some(CombatCommand::Back);
            }
            let idx = raw.parse::<usize>().ok()?.checked_sub(1)?;
            Some(CombatCommand::Select(idx))
        }
        _ => match raw.to_ascii_uppercase().as_str() {
            "F" | "1" => Some(CombatCommand::Fight),
            "R" | "2" => Some(CombatCommand::Flee),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_accepts_indices_and_names() {
        assert_eq!(pick("2", &Warez::ALL, Warez::name), Some(Warez::BlackIce));
        assert_eq!(pick("blackice", &Warez::ALL, Warez::name), Some(Warez::BlackIce));
        assert_eq!(pick("0", &Warez::ALL, Warez::name), None);
        assert_eq!(pick("9", &Warez::ALL, Warez::name), None);
        assert_eq!(pick("", &Warez::ALL, Warez::name), None);
    }

    #[test]
    fn armory_lists_weapons_then_supplies() {
        let entries = armory_entries();
        assert_eq!(entries.len(), 8);
        assert_eq!(entries[0], ArmoryEntry::Weapon(Weapon::Beretta));
        assert_eq!(pick("m4 ammo", &entries, ArmoryEntry::name), Some(ArmoryEntry::Supply(Supply::M4Ammo)));
    }

    #[test]
    fn quantities_must_be_numeric() {
        assert_eq!(parse_quantity(" 12 "), Some(12));
        assert_eq!(parse_quantity("-1"), None);
        assert_eq!(parse_quantity("lots"), None);
    }

    #[test]
    fn guesses_keep_any_integer() {
        assert_eq!(parse_guess(" 7 "), Some(7));
        assert_eq!(parse_guess("-1"), Some(-1));
        assert_eq!(parse_guess("300"), Some(300));
        assert_eq!(parse_guess("seven"), None);
    }

    #[test]
    fn closed_input_backs_out_instead_of_fleeing() {
        assert_eq!(
            combat_command(CombatPhase::ChoosingAction, None),
            CombatCommand::Back
        );
        assert_eq!(
            combat_command(CombatPhase::ChoosingAction, Some("x")),
            CombatCommand::Back
        );
        assert_eq!(
            combat_command(CombatPhase::ChoosingAction, Some("r")),
            CombatCommand::Flee
        );
    }

    #[test]
    fn combat_input_depends_on_phase() {
        assert_eq!(
            parse_combat(CombatPhase::ChoosingAction, "f"),
            Some(CombatCommand::Fight)
        );
        assert_eq!(
            parse_combat(CombatPhase::ChoosingAction, "R"),
            Some(CombatCommand::Flee)
        );
        assert_eq!(
            parse_combat(CombatPhase::SelectingWeapon, "1"),
            Some(CombatCommand::Select(0))
        );
        assert_eq!(
            parse_combat(CombatPhase::SelectingWeapon, "b"),
            Some(CombatCommand::Back)
        );
        assert_eq!(parse_combat(CombatPhase::SelectingWeapon, "0"), None);
    }
}
