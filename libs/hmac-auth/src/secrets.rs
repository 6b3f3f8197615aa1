//! Secret resolution
//!
//! Maps a source id to its signing secret. A per-source entry wins over the
//! shared fallback; blank values count as "not configured". Each tier builds
//! its own resolver from its own configuration namespace (the connector keeps
//! inbound and outbound secrets apart), so instances must never be shared
//! between directions.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use types::source::{is_blank, source_key};

/// Signing secret. `Debug` output is redacted so secrets never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw key bytes (UTF-8) for HMAC
    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Secret configuration for one direction (inbound or outbound)
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    /// Fallback used for any source without its own entry. Blank disables it.
    pub shared_secret: String,
    /// Per-source overrides; keys match source ids case-insensitively.
    pub source_secrets: HashMap<String, String>,
}

impl fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sources: Vec<&String> = self.source_secrets.keys().collect();
        sources.sort();
        f.debug_struct("SecretConfig")
            .field("shared_secret_set", &!is_blank(&self.shared_secret))
            .field("sources", &sources)
            .finish()
    }
}

/// Resolves the signing secret for a source
#[derive(Debug, Clone)]
pub struct SecretResolver {
    per_source: HashMap<String, Secret>,
    shared: Option<Secret>,
}

impl SecretResolver {
    pub fn new(config: &SecretConfig) -> Self {
        let per_source = config
            .source_secrets
            .iter()
            .filter(|(_, secret)| !is_blank(secret))
            .map(|(source_id, secret)| (source_key(source_id.trim()), Secret::new(secret.clone())))
            .collect();

        let shared = if is_blank(&config.shared_secret) {
            None
        } else {
            Some(Secret::new(config.shared_secret.clone()))
        };

        Self { per_source, shared }
    }

    /// Resolve a secret: per-source entry, then shared fallback, else `None`.
    pub fn resolve(&self, source_id: &str) -> Option<&Secret> {
        self.per_source
            .get(&source_key(source_id))
            .or(self.shared.as_ref())
    }

    /// True when neither a shared secret nor any per-source secret is configured
    pub fn is_empty(&self) -> bool {
        self.per_source.is_empty() && self.shared.is_none()
    }
}
