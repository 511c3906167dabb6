//! Table-backed store.

use super::TaskStore;
use crate::error::TdResult;
use crate::types::{Task, TaskId};
use rusqlite::{Connection, Row, params};
use std::path::Path;
use tracing::{debug, info};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// SQLite-backed task store. Ids come from `AUTOINCREMENT`, so they are never
/// reused after a delete.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> TdResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> TdResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> TdResult<Self> {
        let report = embedded::migrations::runner().run(&mut conn)?;
        for migration in report.applied_migrations() {
            info!(version = migration.version(), name = migration.name(), "Applied migration");
        }
        Ok(Self { conn })
    }
}

fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    // Older databases may hold NULLs in the untyped columns.
    let text: Option<String> = row.get("text")?;
    let timestamp: Option<i64> = row.get("timestamp")?;
    let done: Option<bool> = row.get("done")?;

    Ok(Task {
        id: row.get("id")?,
        text: text.unwrap_or_default(),
        timestamp: timestamp.unwrap_or_default(),
        done: done.unwrap_or(false),
    })
}

impl TaskStore for SqliteStore {
    fn fetch_all(&self) -> TdResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, timestamp, done FROM tasks ORDER BY id")?;
        let tasks = stmt
            .query_map([], parse_task_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    fn insert_at(&self, text: &str, timestamp: i64) -> TdResult<Task> {
        self.conn.execute(
            "INSERT INTO tasks (text, timestamp, done) VALUES (?1, ?2, ?3)",
            params![text, timestamp, false],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, "Inserted task");
        Ok(Task::new(id, text, timestamp))
    }

    fn update_text(&self, id: TaskId, text: &str) -> TdResult<bool> {
        let rows = self.conn.execute(
            "UPDATE tasks SET text = ?1 WHERE id = ?2",
            params![text, id],
        )?;
        Ok(rows > 0)
    }

    fn set_done(&self, id: TaskId, done: bool) -> TdResult<bool> {
        let rows = self.conn.execute(
            "UPDATE tasks SET done = ?1 WHERE id = ?2",
            params![done, id],
        )?;
        Ok(rows > 0)
    }

    fn delete_by_id(&self, id: TaskId) -> TdResult<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reopening_keeps_existing_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite3");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_at("first", 100).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let tasks = store.fetch_all().unwrap();
        assert_eq!(tasks, vec![Task::new(1, "first", 100)]);
    }

    #[test]
    fn accepts_table_created_by_hand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.sqlite3");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE tasks (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    text TEXT,
                    timestamp INTEGER,
                    done BOOLEAN
                );
                INSERT INTO tasks (text, timestamp, done) VALUES ('legacy', 42, 1);
                INSERT INTO tasks (text, timestamp, done) VALUES (NULL, NULL, NULL);",
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let tasks = store.fetch_all().unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].text, "legacy");
        assert!(tasks[0].done);
        assert_eq!(tasks[1].text, "");
        assert!(!tasks[1].done);
    }
}
