//! History record model
//!
//! One row per accepted snapshot. The payload is the snapshot's JSON form,
//! opaque to the storage layer; only the source id and the two timestamps are
//! used for filtering and ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use types::Snapshot;

/// Record as written (id assigned by the backend)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    pub source_id: String,
    /// Event time reported by the source
    pub timestamp_utc: DateTime<Utc>,
    /// Arrival time at this tier, drives retention
    pub received_utc: DateTime<Utc>,
    pub payload_json: String,
}

impl NewHistoryRecord {
    /// Serialize a snapshot into a record received at `received_utc`.
    pub fn from_snapshot(snapshot: &Snapshot, received_utc: DateTime<Utc>) -> serde_json::Result<Self> {
        Ok(Self {
            source_id: snapshot.source_id.clone(),
            timestamp_utc: snapshot.timestamp_utc,
            received_utc,
            payload_json: serde_json::to_string(snapshot)?,
        })
    }
}

/// Stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Monotonic, backend-assigned
    pub id: i64,
    pub source_id: String,
    pub timestamp_utc: DateTime<Utc>,
    pub received_utc: DateTime<Utc>,
    pub payload_json: String,
}

impl HistoryRecord {
    pub fn from_new(id: i64, record: NewHistoryRecord) -> Self {
        Self {
            id,
            source_id: record.source_id,
            timestamp_utc: record.timestamp_utc,
            received_utc: record.received_utc,
            payload_json: record.payload_json,
        }
    }

    /// Decode the payload back into a snapshot.
    pub fn snapshot(&self) -> serde_json::Result<Snapshot> {
        serde_json::from_str(&self.payload_json)
    }
}
