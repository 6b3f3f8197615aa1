//! Snapshot history store
//!
//! Appends every accepted snapshot and serves bounded, newest-first pages per
//! source. Retention is enforced inline: every Nth write deletes records
//! received more than `retention_days` ago.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};
use types::source::is_blank;
use types::Snapshot;

use crate::backend::{HistoryBackend, InMemoryHistoryBackend};
use crate::error::HistoryError;
use crate::record::NewHistoryRecord;
use crate::sqlite::SqliteHistoryBackend;

pub const DEFAULT_HISTORY_TAKE: i64 = 200;
pub const MAX_HISTORY_TAKE: i64 = 1000;
pub const DEFAULT_RETENTION_DAYS: i64 = 30;
pub const DEFAULT_CLEANUP_INTERVAL_WRITES: i64 = 50;

// ── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Sqlite,
    Memory,
}

/// `[persistence]` configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    pub backend: BackendKind,
    pub database_path: PathBuf,
    /// Records received longer ago are deleted; `<= 0` disables retention.
    pub retention_days: i64,
    pub default_history_take: i64,
    pub max_history_take: i64,
    pub retention_cleanup_interval_writes: i64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: BackendKind::Sqlite,
            database_path: PathBuf::from("snapshot-history.db"),
            retention_days: DEFAULT_RETENTION_DAYS,
            default_history_take: DEFAULT_HISTORY_TAKE,
            max_history_take: MAX_HISTORY_TAKE,
            retention_cleanup_interval_writes: DEFAULT_CLEANUP_INTERVAL_WRITES,
        }
    }
}

impl PersistenceConfig {
    /// In-memory configuration, mostly for tests.
    pub fn in_memory() -> Self {
        Self {
            backend: BackendKind::Memory,
            ..Self::default()
        }
    }

    /// Open the configured backend.
    pub async fn open_backend(&self) -> Result<Arc<dyn HistoryBackend>, HistoryError> {
        let backend: Arc<dyn HistoryBackend> = match self.backend {
            BackendKind::Memory => Arc::new(InMemoryHistoryBackend::new()),
            BackendKind::Sqlite => Arc::new(SqliteHistoryBackend::open(self.database_path.clone()).await?),
        };
        Ok(backend)
    }

    fn default_take(&self) -> i64 {
        positive_or(self.default_history_take, DEFAULT_HISTORY_TAKE)
    }

    fn max_take(&self) -> i64 {
        positive_or(self.max_history_take, MAX_HISTORY_TAKE)
    }

    fn cleanup_interval(&self) -> u64 {
        positive_or(self.retention_cleanup_interval_writes, DEFAULT_CLEANUP_INTERVAL_WRITES) as u64
    }
}

fn positive_or(value: i64, fallback: i64) -> i64 {
    if value > 0 {
        value
    } else {
        fallback
    }
}

// ── Store ───────────────────────────────────────────────────────────

pub struct SnapshotHistoryStore {
    backend: Arc<dyn HistoryBackend>,
    config: PersistenceConfig,
    writes: AtomicU64,
}

impl SnapshotHistoryStore {
    pub fn new(backend: Arc<dyn HistoryBackend>, config: PersistenceConfig) -> Self {
        Self {
            backend,
            config,
            writes: AtomicU64::new(0),
        }
    }

    /// Open the configured backend and wrap it.
    pub async fn from_config(config: PersistenceConfig) -> Result<Self, HistoryError> {
        let backend = config.open_backend().await?;
        Ok(Self::new(backend, config))
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Page size actually used for a requested `take`.
    pub fn effective_take(&self, take: Option<i64>) -> usize {
        let requested = match take {
            Some(t) if t > 0 => t,
            _ => self.config.default_take(),
        };
        requested.clamp(1, self.config.max_take()) as usize
    }

    pub async fn append(&self, snapshot: &Snapshot) -> Result<(), HistoryError> {
        self.append_at(snapshot, Utc::now()).await
    }

    /// Append with an explicit receive time.
    ///
    /// Only the insert can fail the call. A failing retention sweep is logged
    /// and retried on the next trigger.
    pub async fn append_at(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Result<(), HistoryError> {
        if !self.config.enabled {
            return Ok(());
        }

        let record = NewHistoryRecord::from_snapshot(snapshot, now)?;
        self.backend.insert(record).await?;

        if self.config.retention_days <= 0 {
            return Ok(());
        }
        let count = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if count % self.config.cleanup_interval() != 0 {
            return Ok(());
        }

        let cutoff = now - Duration::days(self.config.retention_days.min(365_000));
        match self.backend.delete_received_before(cutoff).await {
            Ok(deleted) => info!(
                deleted,
                cutoff = %cutoff,
                retention_days = self.config.retention_days,
                "Applied snapshot history retention"
            ),
            Err(e) => error!(error = %e, cutoff = %cutoff, "Snapshot history retention failed"),
        }
        Ok(())
    }

    /// Newest-first page of snapshots for a source.
    pub async fn query(&self, source_id: &str, take: Option<i64>) -> Result<Vec<Snapshot>, HistoryError> {
        if !self.config.enabled || is_blank(source_id) {
            return Ok(Vec::new());
        }

        let records = self
            .backend
            .query_by_source(source_id.trim(), self.effective_take(take))
            .await?;

        let snapshots = records
            .into_iter()
            .filter_map(|record| match record.snapshot() {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(
                        record_id = record.id,
                        source_id = %record.source_id,
                        error = %e,
                        "Skipping undecodable snapshot history record"
                    );
                    None
                }
            })
            .collect();
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap()
    }

    fn store_with(config: PersistenceConfig) -> (SnapshotHistoryStore, Arc<InMemoryHistoryBackend>) {
        let backend = Arc::new(InMemoryHistoryBackend::new());
        (SnapshotHistoryStore::new(backend.clone(), config), backend)
    }

    fn snapshot(source: &str, offset_secs: i64) -> Snapshot {
        Snapshot::new(source, t0() + Duration::seconds(offset_secs))
    }

    #[tokio::test]
    async fn test_append_then_query_newest_first() {
        let (store, _) = store_with(PersistenceConfig::in_memory());
        for offset in [5, 15, 10] {
            store.append(&snapshot("acct-1", offset)).await.unwrap();
        }

        let page = store.query("acct-1", Some(10)).await.unwrap();
        let times: Vec<_> = page.iter().map(|s| s.timestamp_utc).collect();
        assert_eq!(
            times,
            vec![
                t0() + Duration::seconds(15),
                t0() + Duration::seconds(10),
                t0() + Duration::seconds(5)
            ]
        );
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let config = PersistenceConfig {
            enabled: false,
            ..PersistenceConfig::in_memory()
        };
        let (store, backend) = store_with(config);
        store.append(&snapshot("acct-1", 0)).await.unwrap();
        assert!(backend.is_empty());
        assert!(store.query("acct-1", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_or_unknown_source_is_empty() {
        let (store, _) = store_with(PersistenceConfig::in_memory());
        store.append(&snapshot("acct-1", 0)).await.unwrap();
        assert!(store.query("  ", None).await.unwrap().is_empty());
        assert!(store.query("acct-404", None).await.unwrap().is_empty());
    }

    #[test]
    fn test_take_defaults_and_clamping() {
        let (store, _) = store_with(PersistenceConfig::in_memory());
        assert_eq!(store.effective_take(None), 200);
        assert_eq!(store.effective_take(Some(0)), 200);
        assert_eq!(store.effective_take(Some(-4)), 200);
        assert_eq!(store.effective_take(Some(1)), 1);
        assert_eq!(store.effective_take(Some(5000)), 1000);
    }

    #[test]
    fn test_non_positive_take_config_falls_back() {
        let config = PersistenceConfig {
            default_history_take: 0,
            max_history_take: -1,
            ..PersistenceConfig::in_memory()
        };
        let (store, _) = store_with(config);
        assert_eq!(store.effective_take(None), 200);
        assert_eq!(store.effective_take(Some(5000)), 1000);
    }

    #[test]
    fn test_default_take_capped_by_max() {
        let config = PersistenceConfig {
            default_history_take: 50,
            max_history_take: 10,
            ..PersistenceConfig::in_memory()
        };
        let (store, _) = store_with(config);
        assert_eq!(store.effective_take(None), 10);
    }

    #[tokio::test]
    async fn test_query_respects_take() {
        let (store, _) = store_with(PersistenceConfig::in_memory());
        for offset in 0..5 {
            store.append(&snapshot("acct-1", offset)).await.unwrap();
        }
        assert_eq!(store.query("acct-1", Some(3)).await.unwrap().len(), 3);
        assert_eq!(store.query("acct-1", Some(0)).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_retention_runs_on_interval() {
        let config = PersistenceConfig {
            retention_days: 1,
            retention_cleanup_interval_writes: 3,
            ..PersistenceConfig::in_memory()
        };
        let (store, backend) = store_with(config);

        let old = t0() - Duration::days(3);
        store.append_at(&snapshot("acct-1", 0), old).await.unwrap();
        store.append_at(&snapshot("acct-1", 1), old).await.unwrap();
        assert_eq!(backend.len(), 2);

        // Third write triggers the sweep
        store.append_at(&snapshot("acct-1", 2), t0()).await.unwrap();
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_retention_disabled_keeps_everything() {
        let config = PersistenceConfig {
            retention_days: 0,
            retention_cleanup_interval_writes: 1,
            ..PersistenceConfig::in_memory()
        };
        let (store, backend) = store_with(config);
        store.append_at(&snapshot("acct-1", 0), t0() - Duration::days(400)).await.unwrap();
        store.append_at(&snapshot("acct-1", 1), t0()).await.unwrap();
        assert_eq!(backend.len(), 2);
    }

    #[tokio::test]
    async fn test_non_positive_cleanup_interval_uses_default() {
        let config = PersistenceConfig {
            retention_days: 1,
            retention_cleanup_interval_writes: 0,
            ..PersistenceConfig::in_memory()
        };
        let (store, backend) = store_with(config);
        let old = t0() - Duration::days(3);
        for offset in 0..49 {
            store.append_at(&snapshot("acct-1", offset), old).await.unwrap();
        }
        assert_eq!(backend.len(), 49);
        store.append_at(&snapshot("acct-1", 49), t0()).await.unwrap();
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_record_skipped() {
        let (store, backend) = store_with(PersistenceConfig::in_memory());
        store.append(&snapshot("acct-1", 0)).await.unwrap();
        backend
            .insert(NewHistoryRecord {
                source_id: "acct-1".to_string(),
                timestamp_utc: t0() + Duration::seconds(60),
                received_utc: t0(),
                payload_json: "{broken".to_string(),
            })
            .await
            .unwrap();
        store.append(&snapshot("acct-1", 30)).await.unwrap();

        let page = store.query("acct-1", None).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].timestamp_utc, t0() + Duration::seconds(30));
    }
}
