//! SQLite history backend
//!
//! Every operation opens its own connection on the blocking pool, so
//! concurrent requests never share a session. Timestamps are stored as Unix
//! milliseconds; `source_key` holds the lowercased source id for
//! case-insensitive lookups.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tokio::task;
use tracing::info;
use types::source::source_key;

use crate::backend::HistoryBackend;
use crate::error::HistoryError;
use crate::record::{HistoryRecord, NewHistoryRecord};

const SCHEMA: &str = "\
    PRAGMA journal_mode=WAL;\
    CREATE TABLE IF NOT EXISTS snapshot_history (\
        id INTEGER PRIMARY KEY AUTOINCREMENT,\
        source_id TEXT NOT NULL,\
        source_key TEXT NOT NULL,\
        timestamp_utc_ms INTEGER NOT NULL,\
        received_utc_ms INTEGER NOT NULL,\
        payload_json TEXT NOT NULL);\
    CREATE INDEX IF NOT EXISTS idx_snapshot_history_source_time \
        ON snapshot_history(source_key, timestamp_utc_ms);\
    CREATE INDEX IF NOT EXISTS idx_snapshot_history_received \
        ON snapshot_history(received_utc_ms);";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SqliteHistoryBackend {
    path: PathBuf,
}

impl SqliteHistoryBackend {
    /// Open (creating if needed) the database at `path` and ensure the schema.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let backend = Self { path: path.into() };
        backend
            .with_connection(|conn| {
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await?;
        info!(path = %backend.path.display(), "Snapshot history database ready");
        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_connection<T, F>(&self, op: F) -> Result<T, HistoryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, HistoryError> + Send + 'static,
    {
        let path = self.path.clone();
        task::spawn_blocking(move || {
            let mut conn = Connection::open(&path)?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            op(&mut conn)
        })
        .await?
    }
}

#[async_trait]
impl HistoryBackend for SqliteHistoryBackend {
    async fn insert(&self, record: NewHistoryRecord) -> Result<i64, HistoryError> {
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO snapshot_history \
                 (source_id, source_key, timestamp_utc_ms, received_utc_ms, payload_json) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.source_id,
                    source_key(&record.source_id),
                    record.timestamp_utc.timestamp_millis(),
                    record.received_utc.timestamp_millis(),
                    record.payload_json,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn delete_received_before(&self, cutoff: DateTime<Utc>) -> Result<u64, HistoryError> {
        let cutoff_ms = cutoff.timestamp_millis();
        self.with_connection(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM snapshot_history WHERE received_utc_ms < ?1",
                params![cutoff_ms],
            )?;
            Ok(deleted as u64)
        })
        .await
    }

    async fn query_by_source(&self, source_id: &str, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        let key = source_key(source_id);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, source_id, timestamp_utc_ms, received_utc_ms, payload_json \
                 FROM snapshot_history WHERE source_key = ?1 \
                 ORDER BY timestamp_utc_ms DESC, id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![key, limit], read_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        id: row.get(0)?,
        source_id: row.get(1)?,
        timestamp_utc: from_millis(row.get(2)?),
        received_utc: from_millis(row.get(3)?),
        payload_json: row.get(4)?,
    })
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
