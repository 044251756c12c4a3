//! SQLite result store — bridges the preview step and the download
//! step, and owns the retention sweep.
//!
//! RULE: Only store.rs talks to the database. Callers hold a
//! `ResultStore` and never execute SQL directly. The allocation core
//! itself never touches this module.

use crate::{allocator::AssignmentTask, error::AllocResult};
use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    pub fn open(path: &str) -> AllocResult<Self> {
        let conn = Connection::open(path)?;
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> AllocResult<Self> {
        let conn = Connection::open(":memory:")?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> AllocResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS result_tables (
                 result_id  TEXT PRIMARY KEY,
                 created_at INTEGER NOT NULL,
                 payload    TEXT NOT NULL
             );",
        )?;
        Ok(())
    }

    /// Persist a finished result table. Returns the opaque identifier
    /// the caller hands out for later retrieval.
    pub fn save(&self, tasks: &[AssignmentTask]) -> AllocResult<String> {
        let result_id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(tasks)?;
        self.conn.execute(
            "INSERT INTO result_tables (result_id, created_at, payload) VALUES (?1, ?2, ?3)",
            params![result_id, Utc::now().timestamp(), payload],
        )?;
        log::info!("store: saved result {result_id} ({} rows)", tasks.len());
        Ok(result_id)
    }

    /// Retrieve a result table without consuming it.
    pub fn load(&self, result_id: &str) -> AllocResult<Option<Vec<AssignmentTask>>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM result_tables WHERE result_id = ?1",
                params![result_id],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(p) => Ok(Some(serde_json::from_str(&p)?)),
            None => Ok(None),
        }
    }

    /// Retrieve a result table exactly once: the row is deleted on
    /// successful read. A second take returns None.
    pub fn take(&self, result_id: &str) -> AllocResult<Option<Vec<AssignmentTask>>> {
        let tasks = self.load(result_id)?;
        if tasks.is_some() {
            self.conn.execute(
                "DELETE FROM result_tables WHERE result_id = ?1",
                params![result_id],
            )?;
        }
        Ok(tasks)
    }

    /// Retention sweep: delete result tables older than `max_age`.
    /// Returns the number of rows removed.
    pub fn purge_older_than(&self, max_age: Duration) -> AllocResult<usize> {
        let cutoff = (Utc::now() - max_age).timestamp();
        let removed = self.conn.execute(
            "DELETE FROM result_tables WHERE created_at < ?1",
            params![cutoff],
        )?;
        if removed > 0 {
            log::info!("store: purged {removed} stale result tables");
        }
        Ok(removed)
    }
}
