// Re-export core modules for use by the binary or other consumers
pub mod core;
pub mod data;
pub mod error;
pub mod persistence;
pub mod simulation;
pub mod systems;

// Expose the Game wrapper and the types a frontend needs to drive it
pub use crate::core::config::{EngineConfig, StoreBackend};
pub use crate::core::rng::{Dice, EntropyDice, RandomSource, ScriptedDice};
pub use crate::core::world::{Frontend, Game, GameEvent, RunSummary, Snapshot, StartMode};
pub use crate::error::{ConfigError, PersistenceError};
pub use crate::persistence::{JsonSaveFile, MemorySaveStore, SaveRepository, SqliteSaveStore};
pub use crate::simulation::player::PlayerState;
pub use crate::systems::actions::{ActionOutcome, PlayerAction};
