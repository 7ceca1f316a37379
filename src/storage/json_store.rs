//! JSON-file message store — one `messages_{group_id}.json` array per group.
//!
//! Writes go to a temporary sibling file that is renamed over the target,
//! so readers see either the previous set or the new one. `update` holds an
//! OS file lock on `messages_{group_id}.lock`, which also excludes other
//! processes sharing the data directory.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::path_utils;
use super::store::{MessageSet, MessageStore};
use crate::{DigestError, DigestResult};

pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the global data directory.
    pub fn open_default() -> Self {
        Self::new(path_utils::data_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, group_id: &str) -> DigestResult<PathBuf> {
        if !path_utils::is_safe_group_id(group_id) {
            return Err(DigestError::InvalidArgument(format!(
                "group id {:?} cannot be used as a file name",
                group_id
            )));
        }
        Ok(path_utils::messages_path(&self.root, group_id))
    }

    /// Block until this process holds the group's lock file. Released when
    /// the returned handle is dropped.
    fn lock_group(&self, group_id: &str) -> DigestResult<File> {
        self.path_for(group_id)?;
        std::fs::create_dir_all(&self.root)?;
        let path = path_utils::messages_lock_path(&self.root, group_id);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        FileExt::lock_exclusive(&file).map_err(|e| {
            DigestError::Storage(format!("Failed to lock {}: {}", path.display(), e))
        })?;
        Ok(file)
    }
}

impl MessageStore for JsonFileStore {
    fn get(&self, group_id: &str) -> DigestResult<MessageSet> {
        let path = self.path_for(group_id)?;
        if !path.exists() {
            return Ok(MessageSet::new());
        }
        let content = std::fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(MessageSet::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            DigestError::Storage(format!("Corrupt message file {}: {}", path.display(), e))
        })
    }

    fn put(&self, group_id: &str, set: &MessageSet) -> DigestResult<()> {
        let path = self.path_for(group_id)?;
        std::fs::create_dir_all(&self.root)?;

        let tmp = self
            .root
            .join(format!(".messages_{}.{}.tmp", group_id, uuid::Uuid::new_v4().simple()));
        let json = serde_json::to_vec_pretty(set)?;

        let write = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
            std::fs::rename(&tmp, &path)
        };
        if let Err(e) = write() {
            std::fs::remove_file(&tmp).ok();
            return Err(e.into());
        }

        tracing::debug!(group_id = %group_id, count = set.len(), path = %path.display(), "Message set written");
        Ok(())
    }

    fn update(&self, group_id: &str, apply: &mut dyn FnMut(&mut MessageSet)) -> DigestResult<()> {
        let _lock = self.lock_group(group_id)?;
        let mut set = self.get(group_id)?;
        apply(&mut set);
        self.put(group_id, &set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[test]
    fn test_missing_and_empty_files_are_empty_sets() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.get("123").unwrap().is_empty());

        std::fs::write(path_utils::messages_path(dir.path(), "123"), "").unwrap();
        assert!(store.get("123").unwrap().is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let set = MessageSet::from(vec![
            Message::new("123_0", "Message 0", 1_700_000_000.0),
            Message::new("123_1", "Message 1", 1_699_999_940.0),
        ]);
        store.put("123", &set).unwrap();

        let loaded = store.get("123").unwrap();
        assert_eq!(loaded, set);

        // Readable as a plain JSON array by external tools
        let raw = std::fs::read_to_string(path_utils::messages_path(dir.path(), "123")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], "123_0");
        assert_eq!(value[0]["body"], "Message 0");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.put("g", &MessageSet::from(vec![Message::new("a", "", 1.0)])).unwrap();
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["messages_g.json".to_string()]);
    }

    #[test]
    fn test_update_excludes_a_second_store_on_the_same_dir() {
        let dir = tempfile::tempdir().unwrap();
        let first = JsonFileStore::new(dir.path());
        let second = JsonFileStore::new(dir.path());
        let (loaded_tx, loaded_rx) = std::sync::mpsc::channel();

        std::thread::scope(|s| {
            s.spawn(|| {
                first
                    .update("g", &mut |set| {
                        loaded_tx.send(()).unwrap();
                        std::thread::sleep(std::time::Duration::from_millis(100));
                        set.merge(vec![Message::new("a", "from first", 1.0)]);
                    })
                    .unwrap();
            });
            s.spawn(move || {
                loaded_rx.recv().unwrap();
                second
                    .update("g", &mut |set| {
                        set.merge(vec![Message::new("b", "from second", 2.0)]);
                    })
                    .unwrap();
            });
        });

        let stored = first.get("g").unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.contains("a") && stored.contains("b"));
    }

    #[test]
    fn test_update_rejects_unsafe_group_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(
            store.update("../escape", &mut |_| {}),
            Err(DigestError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(path_utils::messages_path(dir.path(), "g"), "{broken").unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(store.get("g"), Err(DigestError::Storage(_))));
    }

    #[test]
    fn test_rejects_path_like_group_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(
            store.put("../escape", &MessageSet::new()),
            Err(DigestError::InvalidArgument(_))
        ));
    }
}
