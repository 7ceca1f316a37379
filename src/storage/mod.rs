pub mod database;
pub mod group_locks;
pub mod json_store;
pub mod memory_store;
pub mod path_utils;
pub mod sqlite_store;
pub mod store;
pub mod usage_log;

pub use group_locks::GroupLocks;
pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use store::{MessageSet, MessageStore};
pub use usage_log::{UsageLog, UsageRecord};
