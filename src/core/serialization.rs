use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;
use crate::persistence::repository::SaveRepository;
use crate::simulation::player::PlayerState;

pub const DEFAULT_SAVE_PATH: &str = "matrix_1984_save.json";

/// Serialize player state into JSON for persistence.
pub fn save_state_to_json(state: &PlayerState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(state)
}

/// Deserialize JSON back into player state. Missing holdings and perks
/// default to empty and vitals are clamped.
pub fn load_state_from_json(data: &str) -> serde_json::Result<PlayerState> {
    let mut state: PlayerState = serde_json::from_str(data)?;
    state.normalize();
    Ok(state)
}

/// Write player state to a file path.
pub fn save_state_to_path<P: AsRef<Path>>(state: &PlayerState, path: P) -> Result<(), PersistenceError> {
    let json = save_state_to_json(state)?;
    fs::write(path.as_ref(), json).map_err(|source| PersistenceError::Io {
        path: path.as_ref().to_path_buf(),
        source,
    })
}

/// Read player state from a file path. A missing file is not an error.
pub fn load_state_from_path<P: AsRef<Path>>(path: P) -> Result<Option<PlayerState>, PersistenceError> {
    let data = match fs::read_to_string(path.as_ref()) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.as_ref().to_path_buf(),
                source,
            })
        }
    };
    Ok(Some(load_state_from_json(&data)?))
}

/// Single JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonSaveFile {
    path: PathBuf,
}

impl JsonSaveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonSaveFile {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_PATH)
    }
}

impl SaveRepository for JsonSaveFile {
    fn load(&mut self) -> Result<Option<PlayerState>, PersistenceError> {
        load_state_from_path(&self.path)
    }

    fn save(&mut self, state: &PlayerState) -> Result<(), PersistenceError> {
        save_state_to_path(state, &self.path)
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
