//! Process configuration, read from the environment.
//!
//! | variable              | values          | default            |
//! |-----------------------|-----------------|--------------------|
//! | `AGRISTOCK_STORE`     | `file`/`memory` | `file`             |
//! | `AGRISTOCK_DATA_DIR`  | path            | `./agristock-data` |
//! | `AGRISTOCK_SEED`      | `true`/`false`  | `true`             |

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::store::{DataStore, InMemoryStore, JsonFileStore, StoreError};

pub const STORE_VAR: &str = "AGRISTOCK_STORE";
pub const DATA_DIR_VAR: &str = "AGRISTOCK_DATA_DIR";
pub const SEED_VAR: &str = "AGRISTOCK_SEED";

const DEFAULT_DATA_DIR: &str = "./agristock-data";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: unsupported value {value:?} (expected {expected})")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    /// Write fixture data into absent collections at startup.
    pub seed: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            seed: true,
        }
    }
}

impl AppConfig {
    pub fn new(backend: StoreBackend, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: bool) -> Self {
        self.seed = seed;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from any variable source; unset or blank values fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = get(STORE_VAR) {
            config.backend = match value.to_ascii_lowercase().as_str() {
                "file" => StoreBackend::File,
                "memory" => StoreBackend::Memory,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: STORE_VAR,
                        value,
                        expected: "file|memory",
                    });
                }
            };
        }
        if let Some(value) = get(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(value);
        }
        if let Some(value) = get(SEED_VAR) {
            config.seed = value
                .to_ascii_lowercase()
                .parse::<bool>()
                .map_err(|_| ConfigError::Invalid {
                    var: SEED_VAR,
                    value,
                    expected: "true|false",
                })?;
        }

        Ok(config)
    }

    /// Open the configured backend.
    pub fn open_store(&self) -> Result<Arc<dyn DataStore>, StoreError> {
        let store: Arc<dyn DataStore> = match self.backend {
            StoreBackend::Memory => Arc::new(InMemoryStore::new()),
            StoreBackend::File => Arc::new(JsonFileStore::open(&self.data_dir)?),
        };
        tracing::info!(backend = ?self.backend, data_dir = %self.data_dir.display(), "store ready");
        Ok(store)
    }
}
