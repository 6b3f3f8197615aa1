//! Nonce replay guard
//!
//! Remembers which `(source, nonce)` pairs were accepted and until when.
//! Registration is per-key atomic on a sharded map, so traffic for one
//! source never waits on a global lock held for another.
//!
//! Expired entries are reclaimed inline: every `sweep_interval`-th call
//! sweeps the whole table, so memory stays bounded by the distinct nonces
//! seen within roughly one sweep interval plus one TTL.
//!
//! A nonce may be accepted again once its entry has expired. Callers pick a
//! TTL that outlives the period in which the original request could still
//! be accepted; the validator keeps each nonce until its timestamp is
//! past the clock-skew window.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use types::source::source_key;

/// TTL substituted when a caller passes zero or a negative TTL (5 minutes).
pub const DEFAULT_NONCE_TTL_SECS: i64 = 300;

/// Registrations between two full sweeps.
pub const DEFAULT_SWEEP_INTERVAL: u64 = 128;

/// In-memory nonce table.
///
/// Constructed once per validating tier at process start and shared by
/// reference; tests build isolated instances.
#[derive(Debug)]
pub struct ReplayGuard {
    /// (source key, nonce) -> expiration instant
    expirations: DashMap<(String, String), DateTime<Utc>>,
    /// Total `register` calls, drives the sweep cadence
    registrations: AtomicU64,
    sweep_interval: u64,
}

impl ReplayGuard {
    /// Create a guard sweeping every `sweep_interval` registrations (0 → default).
    pub fn new(sweep_interval: u64) -> Self {
        let sweep_interval = if sweep_interval == 0 {
            DEFAULT_SWEEP_INTERVAL
        } else {
            sweep_interval
        };
        Self {
            expirations: DashMap::new(),
            registrations: AtomicU64::new(0),
            sweep_interval,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_SWEEP_INTERVAL)
    }

    /// Register a nonce.
    ///
    /// Returns `true` on first acceptance of the pair within its validity
    /// window (or when a previous entry has expired, in which case its
    /// expiration is refreshed), `false` on replay.
    pub fn register(&self, source_id: &str, nonce: &str, now: DateTime<Utc>, ttl: Duration) -> bool {
        let ttl = if ttl <= Duration::zero() {
            Duration::seconds(DEFAULT_NONCE_TTL_SECS)
        } else {
            ttl
        };
        let expiration = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        let key = (source_key(source_id), nonce.to_string());

        // The entry guard holds its shard lock; it must be released before
        // sweeping, which locks every shard in turn.
        let accepted = match self.expirations.entry(key) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    false
                } else {
                    entry.insert(expiration);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(expiration);
                true
            }
        };

        self.sweep_occasionally(now);
        accepted
    }

    /// Number of tracked nonces (expired ones included until the next sweep).
    pub fn len(&self) -> usize {
        self.expirations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expirations.is_empty()
    }

    fn sweep_occasionally(&self, now: DateTime<Utc>) {
        let count = self.registrations.fetch_add(1, Ordering::Relaxed) + 1;
        if count % self.sweep_interval != 0 {
            return;
        }
        self.expirations.retain(|_, expiration| *expiration > now);
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::with_defaults()
    }
}
