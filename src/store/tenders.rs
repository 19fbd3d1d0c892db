use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::StoreError;
use crate::models::TenderRecord;
use crate::store::open_connection;

/// Stores captured tender records and protects against duplicates.
///
/// Uniqueness is enforced on `(external_id, source)`: the first write wins
/// and later duplicates are silently ignored, never merged or updated.
#[derive(Clone)]
pub struct RawTenderStore {
    connection: Arc<Mutex<Connection>>,
}

impl RawTenderStore {
    pub fn new(database_path: &str) -> Result<Self, StoreError> {
        let conn = open_connection(database_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tenders_raw (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id TEXT NOT NULL,
                title TEXT NOT NULL,
                summary TEXT NOT NULL,
                link TEXT NOT NULL,
                published_at TEXT NOT NULL,
                deadline_at TEXT,
                buyer_name TEXT NOT NULL,
                region TEXT NOT NULL,
                cpv TEXT NOT NULL,
                budget_amount REAL,
                source TEXT NOT NULL,
                captured_at TEXT NOT NULL,
                UNIQUE (external_id, source)
            )",
            [],
        )?;

        Ok(Self {
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a batch of records inside one transaction, ignoring rows whose
    /// `(external_id, source)` already exists. Returns the number of rows
    /// actually inserted; duplicates do not count.
    ///
    /// `captured_at` is stored per row for audit only.
    pub fn upsert_many(
        &self,
        tenders: &[TenderRecord],
        captured_at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        if tenders.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection.lock().unwrap();
        let tx = conn.transaction()?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO tenders_raw (
                    external_id, title, summary, link, published_at,
                    deadline_at, buyer_name, region, cpv, budget_amount,
                    source, captured_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;

            for tender in tenders {
                inserted += stmt.execute(params![
                    tender.external_id,
                    tender.title,
                    tender.summary,
                    tender.link,
                    tender.published_at,
                    tender.deadline_at,
                    tender.buyer_name,
                    tender.region,
                    tender.cpv,
                    tender.budget_amount,
                    tender.source,
                    captured_at,
                ])?;
            }
        }

        tx.commit()?;

        debug!("Upserted batch: {} of {} rows new", inserted, tenders.len());
        Ok(inserted)
    }

    /// Total number of stored records.
    pub fn count_all(&self) -> Result<i64, StoreError> {
        let conn = self.connection.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM tenders_raw", [], |row| row.get(0))?;
        Ok(count)
    }
}
