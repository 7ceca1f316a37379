use crate::constants::SQLITE_BUSY_TIMEOUT_MS;
use crate::{DigestError, DigestResult};
use rusqlite::Connection;

/// Ouvre une connexion SQLite avec les pragmas appropries
pub fn open_connection(path: &std::path::Path) -> DigestResult<Connection> {
    // Create parent directories if needed
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)
        .map_err(|e| DigestError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), "Database connection opened");

    configure(&conn)?;
    migrate(&conn)?;
    Ok(conn)
}

/// Pragmas:
/// - journal_mode = WAL
/// - busy_timeout = SQLITE_BUSY_TIMEOUT_MS (constants.rs)
/// - synchronous = NORMAL
fn configure(conn: &Connection) -> DigestResult<()> {
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = {};
         PRAGMA synchronous = NORMAL;
         PRAGMA temp_store = MEMORY;",
        SQLITE_BUSY_TIMEOUT_MS,
    ))
    .map_err(|e| DigestError::Storage(format!("Failed to configure pragmas: {}", e)))?;
    Ok(())
}

/// Schema for the message store. Idempotent.
pub fn migrate(conn: &Connection) -> DigestResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS messages (
             group_id  TEXT NOT NULL,
             id        TEXT NOT NULL,
             body      TEXT NOT NULL,
             timestamp REAL NOT NULL,
             sender    TEXT,
             reactions INTEGER NOT NULL DEFAULT 0,
             seq       INTEGER NOT NULL,
             PRIMARY KEY (group_id, id)
         );
         CREATE INDEX IF NOT EXISTS idx_messages_group_ts ON messages(group_id, timestamp);",
    )
    .map_err(|e| DigestError::Storage(format!("Migration failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_db_path() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        (dir, path)
    }

    #[test]
    fn test_open_connection_smoke() {
        let (_dir, path) = tmp_db_path();
        let conn = open_connection(&path);
        assert!(conn.is_ok(), "open_connection should not error");
    }

    #[test]
    fn test_busy_timeout_set_correctly() {
        let (_dir, path) = tmp_db_path();
        let conn = open_connection(&path).unwrap();
        let timeout: u32 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, SQLITE_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let (_dir, path) = tmp_db_path();
        let conn = open_connection(&path).unwrap();
        migrate(&conn).unwrap();
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }
}
