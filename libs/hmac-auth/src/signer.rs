//! Client-side request signing
//!
//! Used by the connector to sign forwarded snapshots. The signature covers the
//! exact bytes that will be sent, so callers must serialize once and reuse the
//! same buffer for both signing and transmission.

use chrono::Utc;
use http::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;
use uuid::Uuid;

use crate::codec;
use crate::headers;
use crate::secrets::SecretResolver;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("no signing secret configured for source {source_id}")]
    SecretNotConfigured { source_id: String },

    #[error("value for {header} is not a valid header value")]
    InvalidHeaderValue { header: &'static str },
}

/// The four authentication headers for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub source_id: String,
    pub timestamp: String,
    pub nonce: String,
    pub signature: String,
}

impl SignedHeaders {
    /// Render as an HTTP header map.
    pub fn to_header_map(&self) -> Result<HeaderMap, SignerError> {
        let mut map = HeaderMap::with_capacity(4);
        for (name, value) in [
            (headers::SOURCE_ID, &self.source_id),
            (headers::TIMESTAMP, &self.timestamp),
            (headers::NONCE, &self.nonce),
            (headers::SIGNATURE, &self.signature),
        ] {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| SignerError::InvalidHeaderValue { header: name })?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| SignerError::InvalidHeaderValue { header: name })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

/// Signs outbound requests with secrets from one configuration namespace
#[derive(Debug, Clone)]
pub struct RequestSigner {
    secrets: SecretResolver,
}

impl RequestSigner {
    pub fn new(secrets: SecretResolver) -> Self {
        Self { secrets }
    }

    /// Whether any secret at all is configured
    pub fn is_configured(&self) -> bool {
        !self.secrets.is_empty()
    }

    /// Sign `body` with a fresh nonce and the current time.
    pub fn sign(&self, source_id: &str, body: &[u8]) -> Result<SignedHeaders, SignerError> {
        let nonce = Uuid::new_v4().simple().to_string();
        self.sign_with(source_id, body, Utc::now().timestamp(), &nonce)
    }

    /// Sign `body` with an explicit timestamp and nonce.
    pub fn sign_with(
        &self,
        source_id: &str,
        body: &[u8],
        timestamp: i64,
        nonce: &str,
    ) -> Result<SignedHeaders, SignerError> {
        let secret = self
            .secrets
            .resolve(source_id)
            .ok_or_else(|| SignerError::SecretNotConfigured {
                source_id: source_id.to_string(),
            })?;

        let timestamp = timestamp.to_string();
        let signature = codec::encode_hex(&codec::compute(secret, &timestamp, nonce, body));

        Ok(SignedHeaders {
            source_id: source_id.to_string(),
            timestamp,
            nonce: nonce.to_string(),
            signature,
        })
    }
}
