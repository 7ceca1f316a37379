pub mod config;
pub mod session;
pub mod summarize;
pub mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use group_digest::config::{AppConfig, SourceKind, StoreKind};
use group_digest::source::{ExportFileSource, MessageSource, SimulatedSource};
use group_digest::storage::{path_utils, JsonFileStore, MessageStore, SqliteStore};

/// Resolve the data dir (`--data-dir`, then env, then platform default)
/// and make sure it exists.
pub fn resolve_data_dir(arg: Option<&str>) -> Result<PathBuf> {
    let data_dir = match arg {
        Some(d) => PathBuf::from(path_utils::expand_tilde(d)),
        None => path_utils::data_dir(),
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;
    Ok(data_dir)
}

/// Data directory and config shared by every command.
pub struct Context {
    pub data_dir: PathBuf,
    pub config: AppConfig,
}

impl Context {
    /// Load the config stored in `data_dir`. Call after tracing is set up
    /// so a config that fails to parse is logged.
    pub fn load(data_dir: PathBuf) -> Result<Self> {
        let config = AppConfig::load_from(&data_dir.join("config.json"));
        config.validate().context("Invalid configuration")?;
        Ok(Self { data_dir, config })
    }

    pub fn store(&self) -> Result<Arc<dyn MessageStore>> {
        Ok(match self.config.fetch.store {
            StoreKind::Json => Arc::new(JsonFileStore::new(&self.data_dir)),
            StoreKind::Sqlite => {
                let path = path_utils::messages_db_path(&self.data_dir);
                let store = SqliteStore::open(&path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                Arc::new(store)
            }
        })
    }

    pub fn source(&self, kind: SourceKind) -> Box<dyn MessageSource> {
        match kind {
            SourceKind::Simulated => Box::new(SimulatedSource::anchored_now()),
            SourceKind::Export => Box::new(ExportFileSource::new(&self.data_dir)),
        }
    }
}
