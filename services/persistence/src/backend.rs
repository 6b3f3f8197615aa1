//! Durable store collaborator
//!
//! The history store talks to storage only through [`HistoryBackend`]. Each
//! call is an independent unit of work; implementations must not share a
//! mutable session across concurrent calls.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use types::source::source_key;

use crate::error::HistoryError;
use crate::record::{HistoryRecord, NewHistoryRecord};

#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Append a record, returning its assigned id.
    async fn insert(&self, record: NewHistoryRecord) -> Result<i64, HistoryError>;

    /// Delete every record received strictly before `cutoff`, returning the count.
    async fn delete_received_before(&self, cutoff: DateTime<Utc>) -> Result<u64, HistoryError>;

    /// Up to `limit` records for a source (case-insensitive), newest event first.
    async fn query_by_source(&self, source_id: &str, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError>;
}

// ── In-memory backend ───────────────────────────────────────────────

/// Volatile backend for tests and `backend = "memory"` deployments.
#[derive(Debug, Default)]
pub struct InMemoryHistoryBackend {
    records: Mutex<Vec<HistoryRecord>>,
    next_id: AtomicI64,
}

impl InMemoryHistoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<HistoryRecord>>, HistoryError> {
        self.records
            .lock()
            .map_err(|_| HistoryError::Storage("history lock poisoned".to_string()))
    }
}

#[async_trait]
impl HistoryBackend for InMemoryHistoryBackend {
    async fn insert(&self, record: NewHistoryRecord) -> Result<i64, HistoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock()?.push(HistoryRecord::from_new(id, record));
        Ok(id)
    }

    async fn delete_received_before(&self, cutoff: DateTime<Utc>) -> Result<u64, HistoryError> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|r| r.received_utc >= cutoff);
        Ok((before - records.len()) as u64)
    }

    async fn query_by_source(&self, source_id: &str, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        let key = source_key(source_id);
        let mut matching: Vec<HistoryRecord> = self
            .lock()?
            .iter()
            .filter(|r| source_key(&r.source_id) == key)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp_utc.cmp(&a.timestamp_utc).then(b.id.cmp(&a.id)));
        matching.truncate(limit);
        Ok(matching)
    }
}
