// === Fetch window ===
pub const DEFAULT_WINDOW_SECS: f64 = 86_400.0; // 24h
pub const DEFAULT_BATCH_SIZE: usize = 100;

// === Simulated source ===
pub const SIMULATED_HISTORY_LEN: usize = 200;
pub const SIMULATED_SPACING_SECS: f64 = 60.0;

// === Completion API defaults (overridable via config.json) ===
pub const DEFAULT_LLM_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4";
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 2_000;
pub const DEFAULT_LLM_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// === Bridge scripts ===
pub const DEFAULT_NODE_BIN: &str = "node";
pub const DEFAULT_QR_SCRIPT: &str = "generate_qr.js";
pub const DEFAULT_DOWNLOAD_SCRIPT: &str = "download_messages.js";

// === Data dir override ===
pub const DATA_DIR_ENV: &str = "GROUP_DIGEST_DATA_DIR";

// === SQLite Tuning ===
pub const SQLITE_BUSY_TIMEOUT_MS: u32 = 5_000;
