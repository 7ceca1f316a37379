use std::path::{Path, PathBuf};

use crate::constants::DATA_DIR_ENV;

/// Retourne le repertoire de donnees centralise cross-platform.
/// `GROUP_DIGEST_DATA_DIR` wins when set.
/// Linux: ~/.config/group-digest/
/// macOS: ~/Library/Application Support/group-digest/
/// Windows: %APPDATA%/group-digest/
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(expand_tilde(&dir));
        }
    }
    let base = dirs::config_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    });
    base.join("group-digest")
}

/// Persisted message set of a group: {root}/messages_{group_id}.json
pub fn messages_path(root: &Path, group_id: &str) -> PathBuf {
    root.join(format!("messages_{}.json", group_id))
}

/// Advisory lock guarding a group's read-modify-write: {root}/messages_{group_id}.lock
pub fn messages_lock_path(root: &Path, group_id: &str) -> PathBuf {
    root.join(format!("messages_{}.lock", group_id))
}

/// Raw export written by the download script: {root}/messages_export_{group_id}.json
pub fn export_path(root: &Path, group_id: &str) -> PathBuf {
    root.join(format!("messages_export_{}.json", group_id))
}

/// SQLite message store: {root}/messages.db
pub fn messages_db_path(root: &Path) -> PathBuf {
    root.join("messages.db")
}

/// {root}/groups.json — written by the bridge once connected
pub fn groups_path(root: &Path) -> PathBuf {
    root.join("groups.json")
}

/// {root}/connected.json — `{"connected": bool}`
pub fn connected_path(root: &Path) -> PathBuf {
    root.join("connected.json")
}

/// {root}/qr_code.txt
pub fn qr_code_path(root: &Path) -> PathBuf {
    root.join("qr_code.txt")
}

/// {root}/session/ — WhatsApp login state kept by the bridge scripts
pub fn session_dir(root: &Path) -> PathBuf {
    root.join("session")
}

/// {root}/summary_prompts.json
pub fn prompts_path(root: &Path) -> PathBuf {
    root.join("summary_prompts.json")
}

/// {root}/api_logs.jsonl
pub fn api_log_path(root: &Path) -> PathBuf {
    root.join("api_logs.jsonl")
}

/// A group id is used verbatim in file names, so it must stay a single
/// path component.
pub fn is_safe_group_id(group_id: &str) -> bool {
    !group_id.trim().is_empty()
        && group_id != "."
        && group_id != ".."
        && !group_id.contains(['/', '\\', '\0'])
}

/// Expand ~ to home directory in paths.
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") || path == "~" {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
