//! Snapshot history persistence
//!
//! Keeps a bounded, retained history of accepted snapshots behind a
//! pluggable durable store.
//!
//! # Modules
//! - `record`: History record model
//! - `backend`: Durable store trait and the in-memory implementation
//! - `sqlite`: SQLite implementation (one connection per operation)
//! - `history`: `SnapshotHistoryStore`, retention and page-size policy
//! - `error`: Persistence errors

pub mod record;
pub mod backend;
pub mod sqlite;
pub mod history;
pub mod error;

pub use backend::{HistoryBackend, InMemoryHistoryBackend};
pub use error::HistoryError;
pub use history::{BackendKind, PersistenceConfig, SnapshotHistoryStore};
pub use record::{HistoryRecord, NewHistoryRecord};
pub use sqlite::SqliteHistoryBackend;
