use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, Row, TransactionBehavior};

use super::database;
use super::store::{MessageSet, MessageStore};
use crate::message::Message;
use crate::{DigestError, DigestResult};

/// Message store backed by a single SQLite file (`messages.db`).
///
/// `put` replaces a group's rows inside one transaction.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn message_from_row(row: &Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get("id")?,
        body: row.get("body")?,
        timestamp: row.get("timestamp")?,
        from: row.get("sender")?,
        reactions: row.get("reactions")?,
    })
}

impl SqliteStore {
    pub fn open(path: &Path) -> DigestResult<Self> {
        let conn = database::open_connection(path)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// In-memory database, schema applied.
    pub fn open_in_memory() -> DigestResult<Self> {
        let conn = Connection::open_in_memory()?;
        database::migrate(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> DigestResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DigestError::Storage(format!("SQLite connection lock poisoned: {}", e)))
    }

    /// Distinct group ids with at least one stored message.
    pub fn groups(&self) -> DigestResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT group_id FROM messages ORDER BY group_id")?;
        let ids = stmt
            .query_map([], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}

fn read_set(conn: &Connection, group_id: &str) -> DigestResult<MessageSet> {
    let mut stmt = conn.prepare(
        "SELECT id, body, timestamp, sender, reactions FROM messages
         WHERE group_id = ?1 ORDER BY seq ASC",
    )?;
    let messages = stmt
        .query_map(params![group_id], message_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MessageSet::from(messages))
}

/// Replace the group's rows. Runs inside the caller's transaction.
fn write_set(conn: &Connection, group_id: &str, set: &MessageSet) -> DigestResult<()> {
    conn.execute("DELETE FROM messages WHERE group_id = ?1", params![group_id])?;
    let mut insert = conn.prepare(
        "INSERT INTO messages (group_id, id, body, timestamp, sender, reactions, seq)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (seq, msg) in set.messages().iter().enumerate() {
        insert.execute(params![
            group_id,
            msg.id,
            msg.body,
            msg.timestamp,
            msg.from,
            msg.reactions,
            seq as i64,
        ])?;
    }
    Ok(())
}

impl MessageStore for SqliteStore {
    fn get(&self, group_id: &str) -> DigestResult<MessageSet> {
        let conn = self.conn()?;
        read_set(&conn, group_id)
    }

    fn put(&self, group_id: &str, set: &MessageSet) -> DigestResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        write_set(&tx, group_id, set)?;
        tx.commit()?;
        tracing::debug!(group_id = %group_id, count = set.len(), "Message set committed");
        Ok(())
    }

    /// `BEGIN IMMEDIATE` takes the database write lock before the read, so a
    /// second writer (another process included) waits out `busy_timeout`.
    fn update(&self, group_id: &str, apply: &mut dyn FnMut(&mut MessageSet)) -> DigestResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut set = read_set(&tx, group_id)?;
        apply(&mut set);
        write_set(&tx, group_id, &set)?;
        tx.commit()?;
        tracing::debug!(group_id = %group_id, count = set.len(), "Message set updated");
        Ok(())
    }
}
