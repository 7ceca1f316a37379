//! Completion API usage log — one JSON object per line in `api_logs.jsonl`.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::DigestResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageRecord {
    pub timestamp: f64,
    pub prompt: String,
    pub message_count: usize,
    pub summary: String,
    pub tokens_used: u64,
    pub tokens_input: u64,
    pub tokens_output: u64,
}

pub struct UsageLog {
    path: PathBuf,
}

impl UsageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record. Opened in append mode so concurrent writers never
    /// clobber each other's lines.
    pub fn append(&self, record: &UsageRecord) -> DigestResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// All readable records; malformed lines are skipped.
    pub fn read_all(&self) -> DigestResult<Vec<UsageRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| match serde_json::from_str(l) {
                Ok(r) => Some(r),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed usage log line");
                    None
                }
            })
            .collect())
    }

    /// Sum of `tokens_used` over all records.
    pub fn total_tokens(&self) -> DigestResult<u64> {
        Ok(self.read_all()?.iter().map(|r| r.tokens_used).sum())
    }
}
