use std::path::PathBuf;
use std::time::Duration;

use crate::core::serialization::DEFAULT_SAVE_PATH;
use crate::error::ConfigError;
use crate::simulation::cycle::CYCLE_LIMIT;

pub const DEFAULT_SQLITE_PATH: &str = "matrix_1984_save.db";
pub const DEFAULT_PACE_MS: u64 = 1_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Sqlite,
}

/// Runtime knobs for the terminal shell.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub save_path: PathBuf,
    pub backend: StoreBackend,
    pub cycle_limit: f64,
    /// Pause after each narrated event.
    pub pace: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            backend: StoreBackend::Json,
            cycle_limit: CYCLE_LIMIT,
            pace: Duration::from_millis(DEFAULT_PACE_MS),
        }
    }
}

impl EngineConfig {
    /// Parses `--save <path>`, `--store json|sqlite`, `--cycles <n>` and
    /// `--pace <ms>`. Unknown arguments are ignored, including the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut iter = args.iter();
        let mut config = Self::default();
        let mut save_path = None;

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--save" => save_path = Some(PathBuf::from(value_for(arg, iter.next())?)),
                "--store" => {
                    let value = value_for(arg, iter.next())?;
                    config.backend = match value.to_ascii_lowercase().as_str() {
                        "json" => StoreBackend::Json,
                        "sqlite" => StoreBackend::Sqlite,
                        _ => return Err(invalid(arg, value)),
                    };
                }
                "--cycles" => {
                    let value = value_for(arg, iter.next())?;
                    config.cycle_limit = value
                        .parse::<f64>()
                        .ok()
                        .filter(|limit| limit.is_finite() && *limit >= 1.0)
                        .ok_or_else(|| invalid(arg, value))?;
                }
                "--pace" => {
                    let value = value_for(arg, iter.next())?;
                    let millis = value.parse::<u64>().map_err(|_| invalid(arg, value))?;
                    config.pace = Duration::from_millis(millis);
                }
                _ => {}
            }
        }

        config.save_path = save_path.unwrap_or_else(|| match config.backend {
            StoreBackend::Json => PathBuf::from(DEFAULT_SAVE_PATH),
            StoreBackend::Sqlite => PathBuf::from(DEFAULT_SQLITE_PATH),
        });
        Ok(config)
    }
}

fn value_for<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a str, ConfigError> {
    value
        .map(String::as_str)
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn invalid(flag: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    }
}
