use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access save file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode or decode save data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    InvalidData(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("flag {0} expects a value")]
    MissingValue(String),
    #[error("invalid value {value:?} for {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("encounter band {start}..{end} is empty or outside [0, 1)")]
    BandOutOfRange { start: f64, end: f64 },
    #[error("encounter band starting at {start} overlaps the previous band ending at {previous_end}")]
    BandOverlap { start: f64, previous_end: f64 },
}
