//! History store over the SQLite backend
//!
//! Exercises the full append/query/retention path against a real database
//! file in a temporary directory.

use chrono::{Duration, TimeZone, Utc};
use persistence::{BackendKind, PersistenceConfig, SnapshotHistoryStore};
use rust_decimal::Decimal;
use tempfile::TempDir;
use types::account::Account;
use types::Snapshot;

fn config(dir: &TempDir) -> PersistenceConfig {
    PersistenceConfig {
        backend: BackendKind::Sqlite,
        database_path: dir.path().join("snapshot-history.db"),
        ..PersistenceConfig::default()
    }
}

#[tokio::test]
async fn test_snapshot_survives_round_trip_through_sqlite() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotHistoryStore::from_config(config(&dir)).await.unwrap();

    let mut snapshot = Snapshot::new("acct-1", Utc.with_ymd_and_hms(2026, 8, 3, 14, 0, 0).unwrap());
    snapshot.account = Account::with_balance("Demo", 42, "EUR", Decimal::new(1234567, 2));
    store.append(&snapshot).await.unwrap();

    let page = store.query("ACCT-1", Some(10)).await.unwrap();
    assert_eq!(page, vec![snapshot]);
}

#[tokio::test]
async fn test_retention_against_sqlite() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotHistoryStore::from_config(PersistenceConfig {
        retention_days: 7,
        retention_cleanup_interval_writes: 2,
        ..config(&dir)
    })
    .await
    .unwrap();

    let now = Utc.with_ymd_and_hms(2026, 8, 20, 0, 0, 0).unwrap();
    let stale = Snapshot::new("acct-1", now - Duration::days(10));
    let fresh = Snapshot::new("acct-1", now);

    store.append_at(&stale, now - Duration::days(10)).await.unwrap();
    store.append_at(&fresh, now).await.unwrap();

    assert_eq!(store.query("acct-1", None).await.unwrap(), vec![fresh]);
}

#[tokio::test]
async fn test_history_page_clamped_to_max() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotHistoryStore::from_config(PersistenceConfig {
        max_history_take: 3,
        ..config(&dir)
    })
    .await
    .unwrap();

    let base = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
    for i in 0..5 {
        store
            .append(&Snapshot::new("acct-1", base + Duration::minutes(i)))
            .await
            .unwrap();
    }

    let page = store.query("acct-1", Some(100)).await.unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].timestamp_utc, base + Duration::minutes(4));
}
