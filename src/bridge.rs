//! WhatsApp bridge — drives the external Node scripts that own the
//! WhatsApp Web session.
//!
//! The scripts communicate through files in the data directory:
//! `qr_code.txt` (login QR payload), `connected.json` (`{"connected": bool}`),
//! `groups.json` (`[{id, name}]`) and `messages_export_{group}.json`.
//! Nothing here is called by the fetcher; the export file is read through
//! `source::ExportFileSource`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;

use crate::config::BridgeConfig;
use crate::constants::DATA_DIR_ENV;
use crate::message::Group;
use crate::storage::path_utils;
use crate::{DigestError, DigestResult};

#[derive(Deserialize)]
struct ConnectionState {
    #[serde(default)]
    connected: bool,
}

pub struct WhatsAppBridge {
    data_dir: PathBuf,
    config: BridgeConfig,
}

impl WhatsAppBridge {
    pub fn new(data_dir: impl Into<PathBuf>, config: BridgeConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn script_dir(&self) -> &Path {
        self.config.script_dir.as_deref().unwrap_or(self.data_dir.as_path())
    }

    /// Run the QR script. Its output is captured into the log.
    pub fn generate_qr(&self) -> DigestResult<()> {
        self.run_script(&self.config.qr_script, &[])
    }

    /// QR payload written by `generate_qr`.
    pub fn qr_code(&self) -> DigestResult<String> {
        let path = path_utils::qr_code_path(&self.data_dir);
        std::fs::read_to_string(&path)
            .map(|s| s.trim().to_string())
            .map_err(|e| DigestError::Bridge(format!("QR code generation failed ({}): {}", path.display(), e)))
    }

    /// Whether the scripts report an active WhatsApp session.
    /// Missing or malformed state means "not connected".
    pub fn is_connected(&self) -> bool {
        let path = path_utils::connected_path(&self.data_dir);
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<ConnectionState>(&content).ok())
            .map(|s| s.connected)
            .unwrap_or(false)
    }

    /// Groups written by the bridge once connected; empty if none yet.
    pub fn list_groups(&self) -> DigestResult<Vec<Group>> {
        let path = path_utils::groups_path(&self.data_dir);
        if !path.exists() {
            tracing::warn!(path = %path.display(), "No groups found, connect first");
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Look a group up by id.
    pub fn find_group(&self, group_id: &str) -> DigestResult<Group> {
        self.list_groups()?
            .into_iter()
            .find(|g| g.id == group_id)
            .ok_or_else(|| DigestError::GroupNotFound(group_id.to_string()))
    }

    /// Run the download script for one group; it writes the export file.
    pub fn download_messages(&self, group_id: &str) -> DigestResult<PathBuf> {
        if !path_utils::is_safe_group_id(group_id) {
            return Err(DigestError::InvalidArgument(format!("invalid group id {:?}", group_id)));
        }
        tracing::info!(group_id = %group_id, "Downloading messages");
        self.run_script(&self.config.download_script, &[group_id])?;
        Ok(path_utils::export_path(&self.data_dir, group_id))
    }

    /// Drop the saved WhatsApp session so the next login starts from a fresh QR.
    pub fn clear_session(&self) -> DigestResult<bool> {
        let session = path_utils::session_dir(&self.data_dir);
        if !session.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&session)?;
        std::fs::remove_file(path_utils::connected_path(&self.data_dir)).ok();
        tracing::info!(path = %session.display(), "Session folder cleared");
        Ok(true)
    }

    fn run_script(&self, script: &str, args: &[&str]) -> DigestResult<()> {
        let child = Command::new(&self.config.node_bin)
            .arg(script)
            .args(args)
            .current_dir(self.script_dir())
            .env(DATA_DIR_ENV, &self.data_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DigestError::Bridge(format!(
                    "Failed to spawn {} {}: {}. Is Node.js installed?",
                    self.config.node_bin, script, e
                ))
            })?;

        let output = child
            .wait_with_output()
            .map_err(|e| DigestError::Bridge(format!("{} wait failed: {}", script, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            tracing::info!(script = %script, stdout = %stdout.trim(), "Bridge script output");
        }
        if !stderr.trim().is_empty() {
            tracing::warn!(script = %script, stderr = %stderr.trim(), "Bridge script stderr");
        }

        if !output.status.success() {
            return Err(DigestError::Bridge(format!(
                "{} failed (exit {}): {}",
                script,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}
