//! Latest-snapshot store
//!
//! One entry per source, keyed case-insensitively. Writers for different
//! sources touch different shards; there is no global lock.

use dashmap::DashMap;
use types::source::{cmp_ignore_case, source_key};
use types::{Snapshot, SourceSummary};

#[derive(Debug, Default)]
pub struct SnapshotStore {
    latest: DashMap<String, Snapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest snapshot for its source (last write wins).
    pub fn upsert(&self, snapshot: Snapshot) {
        self.latest.insert(source_key(&snapshot.source_id), snapshot);
    }

    /// One summary per source, ordered case-insensitively by source id.
    pub fn list_sources(&self) -> Vec<SourceSummary> {
        let mut summaries: Vec<SourceSummary> = self
            .latest
            .iter()
            .map(|entry| entry.value().summary())
            .collect();
        summaries.sort_by(|a, b| cmp_ignore_case(&a.source_id, &b.source_id));
        summaries
    }

    pub fn get_latest(&self, source_id: &str) -> Option<Snapshot> {
        self.latest
            .get(&source_key(source_id))
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}
