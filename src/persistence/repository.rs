use crate::error::PersistenceError;
use crate::simulation::player::PlayerState;

/// Storage for the single saved run.
pub trait SaveRepository {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&mut self) -> Result<Option<PlayerState>, PersistenceError>;
    fn save(&mut self, state: &PlayerState) -> Result<(), PersistenceError>;
    fn clear(&mut self) -> Result<(), PersistenceError>;
}

impl<R: SaveRepository + ?Sized> SaveRepository for Box<R> {
    fn load(&mut self) -> Result<Option<PlayerState>, PersistenceError> {
        (**self).load()
    }

    fn save(&mut self, state: &PlayerState) -> Result<(), PersistenceError> {
        (**self).save(state)
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        (**self).clear()
    }
}

/// Keeps the save in memory. Used by tests and throwaway runs.
#[derive(Debug, Default, Clone)]
pub struct MemorySaveStore {
    state: Option<PlayerState>,
    pub saves: usize,
}

impl MemorySaveStore {
    pub fn with_state(state: PlayerState) -> Self {
        Self {
            state: Some(state),
            saves: 0,
        }
    }

    pub fn state(&self) -> Option<&PlayerState> {
        self.state.as_ref()
    }
}

impl SaveRepository for MemorySaveStore {
    fn load(&mut self) -> Result<Option<PlayerState>, PersistenceError> {
        Ok(self.state.clone().map(|mut state| {
            state.normalize();
            state
        }))
    }

    fn save(&mut self, state: &PlayerState) -> Result<(), PersistenceError> {
        self.state = Some(state.clone());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        self.state = None;
        Ok(())
    }
}
