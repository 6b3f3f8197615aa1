pub mod health;
pub mod snapshots;
pub mod sources;
pub mod ws;
