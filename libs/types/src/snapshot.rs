//! Snapshot envelope
//!
//! A snapshot is one point-in-time report of a source's account, open
//! positions and pending orders. The relay treats the financial content as
//! opaque; only `source_id` and `timestamp_utc` are interpreted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::errors::ValidationError;
use crate::order::Order;
use crate::position::Position;
use crate::source::{is_blank, same_source};

/// Snapshot submitted by a terminal
///
/// Invariant: `source_id` is non-empty once accepted. A payload without a
/// `sourceId` still deserializes (to an empty id) so the endpoint can report
/// a validation error instead of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub source_id: String,
    /// Event time assigned by the originating terminal
    pub timestamp_utc: DateTime<Utc>,
    pub account: Account,
    pub positions: Vec<Position>,
    pub orders: Vec<Order>,
}

impl Snapshot {
    /// Create an empty snapshot for a source
    pub fn new(source_id: impl Into<String>, timestamp_utc: DateTime<Utc>) -> Self {
        Self {
            source_id: source_id.into(),
            timestamp_utc,
            ..Self::default()
        }
    }

    /// Check the declared source against the header-authenticated one.
    ///
    /// Prevents a party holding credentials for source A from submitting
    /// data labelled as source B.
    pub fn check_source(&self, authenticated: &str) -> Result<(), ValidationError> {
        if is_blank(&self.source_id) {
            return Err(ValidationError::MissingSourceId);
        }
        if is_blank(authenticated) || !same_source(&self.source_id, authenticated) {
            return Err(ValidationError::SourceMismatch {
                body: self.source_id.clone(),
                authenticated: authenticated.to_string(),
            });
        }
        Ok(())
    }

    /// Summary projection used by source listings
    pub fn summary(&self) -> SourceSummary {
        SourceSummary {
            source_id: self.source_id.clone(),
            timestamp_utc: self.timestamp_utc,
        }
    }
}

/// One row of the source listing: a source and its latest event time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub source_id: String,
    pub timestamp_utc: DateTime<Utc>,
}

/// Push notification payload: "source X has a new snapshot at T"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotUpdate {
    pub source_id: String,
    pub timestamp_utc: DateTime<Utc>,
}
