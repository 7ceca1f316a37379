use std::collections::HashMap;
use std::sync::Mutex;

use super::store::{MessageSet, MessageStore};
use crate::{DigestError, DigestResult};

/// In-process store. Used by tests and by dry runs that must not touch disk.
#[derive(Default)]
pub struct MemoryStore {
    sets: Mutex<HashMap<String, MessageSet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sets(&self) -> DigestResult<std::sync::MutexGuard<'_, HashMap<String, MessageSet>>> {
        self.sets
            .lock()
            .map_err(|e| DigestError::Storage(format!("Memory store lock poisoned: {}", e)))
    }
}

impl MessageStore for MemoryStore {
    fn get(&self, group_id: &str) -> DigestResult<MessageSet> {
        Ok(self.sets()?.get(group_id).cloned().unwrap_or_default())
    }

    fn put(&self, group_id: &str, set: &MessageSet) -> DigestResult<()> {
        self.sets()?.insert(group_id.to_string(), set.clone());
        Ok(())
    }

    fn update(&self, group_id: &str, apply: &mut dyn FnMut(&mut MessageSet)) -> DigestResult<()> {
        let mut sets = self.sets()?;
        apply(sets.entry(group_id.to_string()).or_default());
        Ok(())
    }
}
