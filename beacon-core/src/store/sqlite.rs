//! SQLite-backed event store
//!
//! Uses a single `offline_events` table with embedded migrations managed
//! via PRAGMA user_version. `write_all` rewrites the table in one
//! transaction so the whole-collection atomicity contract holds.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::types::Event;

use super::EventStore;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    CREATE TABLE IF NOT EXISTS offline_events (
        seq      INTEGER PRIMARY KEY AUTOINCREMENT,
        payload  TEXT NOT NULL
    );
    "#,
];

/// Durable store handle (single connection)
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrency with readers
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Run migrations on this store
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let current: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        for version in current..SCHEMA_VERSION {
            conn.execute_batch(MIGRATIONS[version as usize])?;
            conn.pragma_update(None, "user_version", version + 1)?;
        }

        Ok(())
    }
}

impl EventStore for SqliteStore {
    fn read_all(&self) -> Result<Vec<Event>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT payload FROM offline_events ORDER BY seq")?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut events = Vec::new();
        for payload in rows {
            let payload = payload?;
            let event: Event = serde_json::from_str(&payload)
                .map_err(|e| Error::Storage(format!("corrupt stored event: {}", e)))?;
            events.push(event);
        }

        Ok(events)
    }

    fn write_all(&self, events: &[Event]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM offline_events", [])?;
        for event in events {
            let payload = serde_json::to_string(event)?;
            tx.execute(
                "INSERT INTO offline_events (payload) VALUES (?1)",
                params![payload],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM offline_events", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_reads_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_write_all_preserves_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        let events = vec![Event::new("first"), Event::new("second"), Event::new("third")];
        store.write_all(&events).unwrap();

        let stored = store.read_all().unwrap();
        assert_eq!(stored, events);
    }

    #[test]
    fn test_write_all_replaces_previous_contents() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .write_all(&[Event::new("a"), Event::new("b")])
            .unwrap();
        store.write_all(&[Event::new("c")]).unwrap();

        let stored = store.read_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "c");
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.write_all(&[Event::new("a")]).unwrap();
        store.clear().unwrap();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/queue.db");
        let store = SqliteStore::open(&path).unwrap();
        store.write_all(&[Event::new("a")]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_reopen_preserves_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.write_all(&[Event::new("persisted")]).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let stored = store.read_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "persisted");
    }
}
