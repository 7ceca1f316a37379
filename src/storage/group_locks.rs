//! Group lock table — at most one in-flight merge per group.
//!
//! Each group id maps to a lazily created mutex. Different groups never
//! contend with each other; only the table lookup itself is shared.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
pub struct GroupLocks {
    table: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl GroupLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or lazily create the mutex guarding `group_id`.
    pub fn lock_for(&self, group_id: &str) -> Arc<Mutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Group lock table poisoned, recovering");
            poisoned.into_inner()
        });
        table
            .entry(group_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of groups that have been locked at least once.
    pub fn len(&self) -> usize {
        self.table.lock().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Acquire a group mutex. The guarded value is `()`, so a lock poisoned by
/// a panicking holder carries no broken state and is simply taken over.
pub fn acquire<'a>(lock: &'a Mutex<()>, group_id: &str) -> MutexGuard<'a, ()> {
    lock.lock().unwrap_or_else(|poisoned| {
        tracing::warn!(group_id = %group_id, "Group lock poisoned, recovering");
        poisoned.into_inner()
    })
}
