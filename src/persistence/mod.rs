pub mod repository;
pub mod sqlite;

pub use crate::core::serialization::JsonSaveFile;
pub use crate::persistence::repository::{MemorySaveStore, SaveRepository};
pub use crate::persistence::sqlite::SqliteSaveStore;
