//! Edge tier of the snapshot relay
//!
//! Terminals post signed snapshots here; the connector checks them against
//! its inbound secrets and forwards them, re-signed with its outbound
//! secrets, to the cloud API.

pub mod config;
pub mod error;
pub mod forwarder;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ConnectorConfig;
pub use forwarder::{CloudForwarder, ForwardResult};
pub use router::create_router;
pub use state::AppState;
