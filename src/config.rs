//! Application configuration — fetch window, completion API, bridge scripts.
//!
//! Loaded from `{data_dir}/config.json`. Every section falls back to its
//! defaults when the file or a field is missing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants;
use crate::{DigestError, DigestResult};

const CONFIG_FILE: &str = "config.json";

// ============================================================================
// FETCH
// ============================================================================

/// Which message source backs `sync`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Local synthetic history (no WhatsApp session needed).
    #[default]
    Simulated,
    /// Export written by the download script.
    Export,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Export => "export",
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulated" => Ok(Self::Simulated),
            "export" => Ok(Self::Export),
            _ => Err(format!("Unknown message source: {}", s)),
        }
    }
}

/// Where merged messages are persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// One `messages_{group}.json` file per group.
    #[default]
    Json,
    /// Shared `messages.db`.
    Sqlite,
}

impl std::str::FromStr for StoreKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(format!("Unknown message store: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Trailing window in seconds.
    pub window_secs: f64,
    /// Messages requested per source call.
    pub batch_size: usize,
    pub source: SourceKind,
    pub store: StoreKind,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            window_secs: constants::DEFAULT_WINDOW_SECS,
            batch_size: constants::DEFAULT_BATCH_SIZE,
            source: SourceKind::default(),
            store: StoreKind::default(),
        }
    }
}

// ============================================================================
// COMPLETION API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: constants::DEFAULT_LLM_API_BASE.to_string(),
            model: constants::DEFAULT_LLM_MODEL.to_string(),
            max_tokens: constants::DEFAULT_LLM_MAX_TOKENS,
            temperature: constants::DEFAULT_LLM_TEMPERATURE,
            timeout_secs: constants::DEFAULT_LLM_TIMEOUT_SECS,
            api_key_env: constants::DEFAULT_API_KEY_ENV.to_string(),
            system_prompt: constants::DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> DigestResult<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(DigestError::Config(format!(
                "API key not found. Set {} in the environment.",
                self.api_key_env
            ))),
        }
    }
}

// ============================================================================
// BRIDGE SCRIPTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub node_bin: String,
    pub qr_script: String,
    pub download_script: String,
    /// Directory the scripts run in. Defaults to the data directory, which
    /// is where they write `qr_code.txt`, `connected.json` and `groups.json`.
    pub script_dir: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            node_bin: constants::DEFAULT_NODE_BIN.to_string(),
            qr_script: constants::DEFAULT_QR_SCRIPT.to_string(),
            download_script: constants::DEFAULT_DOWNLOAD_SCRIPT.to_string(),
            script_dir: None,
        }
    }
}

// ============================================================================
// APP CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub llm: LlmConfig,
    pub bridge: BridgeConfig,
}

impl AppConfig {
    /// Load from `{data_dir}/config.json`.
    /// Returns defaults if file is missing or invalid.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Invalid config, using defaults"
                );
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save to `{data_dir}/config.json`.
    pub fn save(&self) -> DigestResult<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> DigestResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the fetcher or completion client cannot work with.
    pub fn validate(&self) -> DigestResult<()> {
        if !(self.fetch.window_secs.is_finite() && self.fetch.window_secs > 0.0) {
            return Err(DigestError::Config(format!(
                "fetch.window_secs must be positive, got {}",
                self.fetch.window_secs
            )));
        }
        if self.fetch.batch_size == 0 {
            return Err(DigestError::Config("fetch.batch_size must be positive".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(DigestError::Config("llm.model must not be empty".into()));
        }
        Ok(())
    }
}

/// `{data_dir}/config.json`
pub fn config_path() -> PathBuf {
    crate::storage::path_utils::data_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.fetch.window_secs, 86_400.0);
        assert_eq!(cfg.fetch.batch_size, 100);
        assert_eq!(cfg.fetch.source, SourceKind::Simulated);
        assert_eq!(cfg.fetch.store, StoreKind::Json);
        assert_eq!(cfg.llm.model, "gpt-4");
        assert_eq!(cfg.llm.max_tokens, 2000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"fetch":{"batch_size":25,"source":"export"}}"#).unwrap();

        let cfg = AppConfig::load_from(&path);
        assert_eq!(cfg.fetch.batch_size, 25);
        assert_eq!(cfg.fetch.source, SourceKind::Export);
        assert_eq!(cfg.fetch.window_secs, 86_400.0);
        assert_eq!(cfg.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        let cfg = AppConfig::load_from(&path);
        assert_eq!(cfg.fetch.batch_size, 100);
    }

    #[test]
    fn test_save_roundtrip_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut cfg = AppConfig::default();
        cfg.fetch.window_secs = 3600.0;
        cfg.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).fetch.window_secs, 3600.0);

        cfg.fetch.batch_size = 0;
        assert!(matches!(cfg.validate(), Err(DigestError::Config(_))));
        cfg.fetch.batch_size = 10;
        cfg.fetch.window_secs = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("export".parse::<SourceKind>().unwrap(), SourceKind::Export);
        assert!("whatsapp".parse::<SourceKind>().is_err());
        assert_eq!(SourceKind::Simulated.as_str(), "simulated");
        assert_eq!("sqlite".parse::<StoreKind>().unwrap(), StoreKind::Sqlite);
        assert!("redis".parse::<StoreKind>().is_err());
    }
}
