//! Cloud tier of the snapshot relay
//!
//! Accepts signed snapshot submissions, keeps the latest snapshot per source,
//! persists bounded history and pushes update notices to WebSocket clients.

pub mod config;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod router;
pub mod state;
pub mod store;

pub use config::CloudApiConfig;
pub use router::create_router;
pub use state::AppState;
