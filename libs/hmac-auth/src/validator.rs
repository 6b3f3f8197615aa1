//! Server-side request validation
//!
//! Pipeline, each step with its own failure:
//! 1. the four headers are present exactly once and non-blank
//! 2. a secret resolves for the claimed source
//! 3. the timestamp parses as Unix seconds and is a representable instant
//! 4. the timestamp is within the allowed clock skew (inclusive)
//! 5. the signature parses and matches the recomputed HMAC
//! 6. the nonce has not been seen for this source while its timestamp is
//!    still acceptable
//!
//! The nonce is registered last so that forged or stale requests cannot
//! burn nonces belonging to the legitimate source. It is remembered until
//! one second past `timestamp + skew`; from then on the original request
//! fails step 4, so an expired nonce can never be replayed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use http::HeaderMap;
use serde::Deserialize;

use crate::codec;
use crate::error::AuthFailure;
use crate::headers;
use crate::replay::{ReplayGuard, DEFAULT_SWEEP_INTERVAL};
use crate::secrets::{SecretConfig, SecretResolver};

/// Clock skew used when the configured value is zero or negative (5 minutes).
pub const DEFAULT_ALLOWED_CLOCK_SKEW_SECS: i64 = 300;

/// Validation settings for one inbound namespace
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Allowed |now - X-Timestamp|
    pub allowed_clock_skew_secs: i64,
    /// Nonce registrations between replay-table sweeps
    pub nonce_sweep_interval: u64,
    #[serde(flatten)]
    pub secrets: SecretConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_clock_skew_secs: DEFAULT_ALLOWED_CLOCK_SKEW_SECS,
            nonce_sweep_interval: DEFAULT_SWEEP_INTERVAL,
            secrets: SecretConfig::default(),
        }
    }
}

/// Source id proven by a valid signature (taken from the header, not the body)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSource(String);

impl AuthenticatedSource {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self(source_id.into())
    }

    pub fn source_id(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Validates signed requests against one secret namespace and replay guard
#[derive(Debug)]
pub struct RequestValidator {
    secrets: SecretResolver,
    replay_guard: Arc<ReplayGuard>,
    allowed_skew: Duration,
}

impl RequestValidator {
    pub fn new(
        secrets: SecretResolver,
        replay_guard: Arc<ReplayGuard>,
        allowed_clock_skew_secs: i64,
    ) -> Self {
        Self {
            secrets,
            replay_guard,
            allowed_skew: skew_from_secs(allowed_clock_skew_secs),
        }
    }

    /// Build a validator with its own replay guard from configuration
    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(
            SecretResolver::new(&config.secrets),
            Arc::new(ReplayGuard::new(config.nonce_sweep_interval)),
            config.allowed_clock_skew_secs,
        )
    }

    /// Effective skew window
    pub fn allowed_skew(&self) -> Duration {
        self.allowed_skew
    }

    /// Validate against the current wall clock.
    pub fn validate(&self, headers: &HeaderMap, body: &[u8]) -> Result<AuthenticatedSource, AuthFailure> {
        self.validate_at(headers, body, Utc::now())
    }

    /// Validate as of `now`.
    pub fn validate_at(
        &self,
        headers: &HeaderMap,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedSource, AuthFailure> {
        let source_id = single_header(headers, headers::SOURCE_ID)?;
        let timestamp_raw = single_header(headers, headers::TIMESTAMP)?;
        let nonce = single_header(headers, headers::NONCE)?;
        let signature_raw = single_header(headers, headers::SIGNATURE)?;

        let secret = self
            .secrets
            .resolve(source_id)
            .ok_or(AuthFailure::UnknownSource)?;

        let unix_seconds: i64 = timestamp_raw
            .parse()
            .map_err(|_| AuthFailure::BadTimestampFormat)?;
        let request_time = DateTime::<Utc>::from_timestamp(unix_seconds, 0)
            .ok_or(AuthFailure::TimestampOutOfRange)?;

        if now.signed_duration_since(request_time).abs() > self.allowed_skew {
            return Err(AuthFailure::ClockSkewExceeded);
        }

        let expected = codec::compute(secret, timestamp_raw, nonce, body);
        let provided = codec::parse(signature_raw).map_err(|_| AuthFailure::BadSignatureFormat)?;
        if !codec::verify(&expected, &provided) {
            return Err(AuthFailure::SignatureMismatch);
        }

        if !self
            .replay_guard
            .register(source_id, nonce, now, self.nonce_ttl(request_time, now))
        {
            return Err(AuthFailure::NonceReplay);
        }

        Ok(AuthenticatedSource::new(source_id))
    }

    /// Time left until `request_time` falls outside the skew window, plus one
    /// second for the sub-second part of `now`.
    fn nonce_ttl(&self, request_time: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        let last_accepted = request_time
            .checked_add_signed(self.allowed_skew)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        last_accepted.signed_duration_since(now) + Duration::seconds(1)
    }
}

/// Exactly one value, valid visible ASCII, non-blank after trimming.
fn single_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, AuthFailure> {
    let mut values = headers.get_all(name).iter();
    let (Some(value), None) = (values.next(), values.next()) else {
        return Err(AuthFailure::MissingOrInvalidHeader(name));
    };

    let value = value
        .to_str()
        .map_err(|_| AuthFailure::MissingOrInvalidHeader(name))?
        .trim();
    if value.is_empty() {
        return Err(AuthFailure::MissingOrInvalidHeader(name));
    }
    Ok(value)
}

fn skew_from_secs(secs: i64) -> Duration {
    let secs = if secs > 0 { secs } else { DEFAULT_ALLOWED_CLOCK_SKEW_SECS };
    Duration::try_seconds(secs).unwrap_or(Duration::seconds(DEFAULT_ALLOWED_CLOCK_SKEW_SECS))
}
