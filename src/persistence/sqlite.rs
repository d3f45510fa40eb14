use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::data::catalog::{Node, Supply, Warez, Weapon};
use crate::error::PersistenceError;
use crate::persistence::repository::SaveRepository;
use crate::simulation::perks::Perk;
use crate::simulation::player::PlayerState;

const SAVE_SCHEMA_VERSION: i64 = 1;
const SAVE_FORMAT_VERSION: i64 = 1;

const SAVE_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS save_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL,
  save_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS player_state (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  credits INTEGER NOT NULL,
  life INTEGER NOT NULL,
  armor INTEGER NOT NULL,
  location TEXT NOT NULL,
  cycle REAL NOT NULL,
  escapes INTEGER NOT NULL,
  profit_start INTEGER NOT NULL,
  people_freed INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS player_holdings (
  category TEXT NOT NULL,
  item TEXT NOT NULL,
  quantity INTEGER NOT NULL,
  PRIMARY KEY (category, item)
);

CREATE TABLE IF NOT EXISTS player_perks (
  perk TEXT PRIMARY KEY
);
"#;

const CATEGORY_WAREZ: &str = "warez";
const CATEGORY_WEAPON: &str = "weapon";
const CATEGORY_SUPPLY: &str = "supply";

fn perk_to_str(perk: Perk) -> &'static str {
    match perk {
        Perk::HeavilyArmed => "heavily_armed",
        Perk::EdgeRunner => "edge_runner",
        Perk::DataBroker => "data_broker",
        Perk::EliteOperator => "elite_operator",
    }
}

fn perk_from_str(value: &str) -> Result<Perk, PersistenceError> {
    match value {
        "heavily_armed" => Ok(Perk::HeavilyArmed),
        "edge_runner" => Ok(Perk::EdgeRunner),
        "data_broker" => Ok(Perk::DataBroker),
        "elite_operator" => Ok(Perk::EliteOperator),
        _ => Err(PersistenceError::InvalidData(format!(
            "unknown perk {}",
            value
        ))),
    }
}

fn node_from_str(value: &str) -> Result<Node, PersistenceError> {
    Node::from_name(value)
        .ok_or_else(|| PersistenceError::InvalidData(format!("unknown node {}", value)))
}

/// Holdings and perks live in side tables keyed by catalog display names.
pub struct SqliteSaveStore {
    conn: Connection,
}

impl SqliteSaveStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, PersistenceError> {
        let mut store = Self { conn };
        store.conn.execute_batch(SAVE_DB_SCHEMA)?;
        store.ensure_save_meta()?;
        Ok(store)
    }

    pub fn load_state(&self) -> Result<Option<PlayerState>, PersistenceError> {
        let row = self
            .conn
            .query_row(
                "SELECT credits, life, armor, location, cycle, escapes, profit_start, people_freed FROM player_state WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, f64>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, i64>(7)?,
                    ))
                },
            )
            .optional()?;
        let Some((credits, life, armor, location, cycle, escapes, profit_start, people_freed)) = row
        else {
            return Ok(None);
        };

        let mut state = PlayerState::starting_at(node_from_str(&location)?);
        state.credits = credits;
        state.set_life(life.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
        state.set_armor(armor.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
        state.cycle = cycle;
        state.escapes = escapes.max(0) as u32;
        state.profit_start = profit_start;
        state.people_freed = people_freed.max(0) as u32;

        self.load_holdings(&mut state)?;
        for perk in self.load_perks()? {
            state.perks.insert(perk);
        }
        state.normalize();
        Ok(Some(state))
    }

    pub fn save_state(&mut self, state: &PlayerState) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM player_state", [])?;
        tx.execute(
            "INSERT INTO player_state (id, credits, life, armor, location, cycle, escapes, profit_start, people_freed) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                state.credits,
                state.life() as i64,
                state.armor() as i64,
                state.location.name(),
                state.cycle,
                state.escapes as i64,
                state.profit_start,
                state.people_freed as i64
            ],
        )?;

        tx.execute("DELETE FROM player_holdings", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO player_holdings (category, item, quantity) VALUES (?1, ?2, ?3)",
            )?;
            for (item, quantity) in &state.inventory {
                insert.execute(params![CATEGORY_WAREZ, item.name(), *quantity as i64])?;
            }
            for (weapon, quantity) in &state.weapons {
                insert.execute(params![CATEGORY_WEAPON, weapon.name(), *quantity as i64])?;
            }
            for (supply, quantity) in &state.ammo {
                insert.execute(params![CATEGORY_SUPPLY, supply.name(), *quantity as i64])?;
            }
        }

        tx.execute("DELETE FROM player_perks", [])?;
        for perk in &state.perks {
            tx.execute(
                "INSERT INTO player_perks (perk) VALUES (?1)",
                params![perk_to_str(*perk)],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn clear_state(&mut self) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM player_state", [])?;
        tx.execute("DELETE FROM player_holdings", [])?;
        tx.execute("DELETE FROM player_perks", [])?;
        tx.commit()?;
        Ok(())
    }

    fn ensure_save_meta(&mut self) -> Result<(), PersistenceError> {
        let meta = self
            .conn
            .query_row(
                "SELECT schema_version, save_version FROM save_meta WHERE id = 1",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match meta {
            Some((schema_version, save_version)) => {
                if schema_version == SAVE_SCHEMA_VERSION && save_version == SAVE_FORMAT_VERSION {
                    return Ok(());
                }
                Err(PersistenceError::InvalidData(format!(
                    "save_meta version mismatch (schema {}, save {}, expected {}, {})",
                    schema_version, save_version, SAVE_SCHEMA_VERSION, SAVE_FORMAT_VERSION
                )))
            }
            None => {
                self.conn.execute(
                    "INSERT INTO save_meta (id, schema_version, save_version) VALUES (1, ?1, ?2)",
                    params![SAVE_SCHEMA_VERSION, SAVE_FORMAT_VERSION],
                )?;
                Ok(())
            }
        }
    }

    fn load_holdings(&self, state: &mut PlayerState) -> Result<(), PersistenceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, item, quantity FROM player_holdings")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        for row in rows {
            let (category, item, quantity) = row?;
            let quantity = quantity.clamp(0, u32::MAX as i64) as u32;
            let unknown = || {
                PersistenceError::InvalidData(format!("unknown {} {}", category, item))
            };
            match category.as_str() {
                CATEGORY_WAREZ => {
                    let item = Warez::from_name(&item).ok_or_else(unknown)?;
                    state.inventory.insert(item, quantity);
                }
                CATEGORY_WEAPON => {
                    let weapon = Weapon::from_name(&item).ok_or_else(unknown)?;
                    state.weapons.insert(weapon, quantity);
                }
                CATEGORY_SUPPLY => {
                    let supply = Supply::from_name(&item).ok_or_else(unknown)?;
                    state.ammo.insert(supply, quantity);
                }
                _ => return Err(unknown()),
            }
        }
        Ok(())
    }

    fn load_perks(&self) -> Result<Vec<Perk>, PersistenceError> {
        let mut stmt = self.conn.prepare("SELECT perk FROM player_perks")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut perks = Vec::new();
        for row in rows {
            perks.push(perk_from_str(&row?)?);
        }
        Ok(perks)
    }
}

impl SaveRepository for SqliteSaveStore {
    fn load(&mut self) -> Result<Option<PlayerState>, PersistenceError> {
        self.load_state()
    }

    fn save(&mut self, state: &PlayerState) -> Result<(), PersistenceError> {
        self.save_state(state)
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        self.clear_state()
    }
}
