//! Search history log backed by SQLite
//!
//! Records every submitted query so the CLI can show recent searches.
//! Uses parameterized queries exclusively.

use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Persistent log of submitted search queries
pub struct SearchHistory {
    conn: Mutex<Connection>,
}

impl SearchHistory {
    /// Open (or create) the history database and initialize its schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS search_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                search_query TEXT NOT NULL,
                timestamp TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_search_history_timestamp
                ON search_history(timestamp);",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Record a submitted query.
    pub fn record(&self, query: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO search_history (search_query) VALUES (?1)",
            params![query],
        )?;
        Ok(())
    }

    /// The most recent searches as (query, timestamp) pairs, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<(String, String)>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT search_query, timestamp FROM search_history
             ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
