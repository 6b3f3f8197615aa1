//! Types library for the snapshot relay
//!
//! Shared model for the account/position snapshots that trading terminals
//! submit, plus the source-id rules both tiers agree on.
//!
//! # Modules
//! - `source`: Source-id normalisation (case-insensitive matching)
//! - `account`: Account summary reported by a terminal
//! - `position`: Open position rows
//! - `order`: Pending order rows
//! - `snapshot`: Snapshot envelope, source summaries and update notices
//! - `errors`: Ingestion validation errors

// Public modules
pub mod source;
pub mod account;
pub mod position;
pub mod order;
pub mod snapshot;
pub mod errors;

pub use snapshot::{Snapshot, SnapshotUpdate, SourceSummary};
