use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Named summary prompts loaded from `summary_prompts.json`
/// (`{"main_topics": "...", "action_items": "..."}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryPrompts {
    prompts: BTreeMap<String, String>,
}

impl SummaryPrompts {
    /// Load prompts; a missing or unreadable file yields an empty set.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Invalid summary prompts file");
                Self::default()
            }),
            Err(_) => {
                tracing::warn!(path = %path.display(), "Summary prompts file not found");
                Self::default()
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.prompts.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prompts.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_prompts.json");
        std::fs::write(&path, r#"{"main_topics":"List the topics","action_items":"List todos"}"#).unwrap();

        let prompts = SummaryPrompts::load(&path);
        assert_eq!(prompts.get("main_topics"), Some("List the topics"));
        assert_eq!(prompts.get("nope"), None);
        assert_eq!(prompts.names().collect::<Vec<_>>(), vec!["action_items", "main_topics"]);
    }

    #[test]
    fn test_missing_or_invalid_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SummaryPrompts::load(&dir.path().join("missing.json")).is_empty());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "[1,2]").unwrap();
        assert!(SummaryPrompts::load(&bad).is_empty());
    }
}
