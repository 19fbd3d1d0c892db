use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::StoreError;
use crate::models::Checkpoint;
use crate::store::open_connection;

/// Persists named progress markers with upsert semantics.
///
/// One well-known key tracks capture progress, but the store is
/// key-parameterized so future pipelines can keep independent checkpoints in
/// the same table.
#[derive(Clone)]
pub struct CheckpointStore {
    connection: Arc<Mutex<Connection>>,
}

impl CheckpointStore {
    pub fn new(database_path: &str) -> Result<Self, StoreError> {
        let conn = open_connection(database_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS pipeline_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Read a checkpoint by key. `None` on a first-ever run.
    pub fn get(&self, key: &str) -> Result<Option<Checkpoint>, StoreError> {
        let conn = self.connection.lock().unwrap();

        let mut stmt =
            conn.prepare("SELECT key, value, updated_at FROM pipeline_state WHERE key = ?1")?;

        let checkpoint = stmt.query_row(params![key], |row| {
            Ok(Checkpoint {
                key: row.get(0)?,
                value: row.get(1)?,
                updated_at: row.get(2)?,
            })
        });

        match checkpoint {
            Ok(checkpoint) => Ok(Some(checkpoint)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or overwrite a checkpoint, recording the write time separately.
    pub fn set(&self, key: &str, value: DateTime<Utc>) -> Result<(), StoreError> {
        let conn = self.connection.lock().unwrap();

        conn.execute(
            "INSERT INTO pipeline_state (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value,
                 updated_at = excluded.updated_at",
            params![key, value, Utc::now()],
        )?;

        debug!("Checkpoint {} advanced to {}", key, value);
        Ok(())
    }
}
