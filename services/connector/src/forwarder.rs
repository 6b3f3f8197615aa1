//! Forwarding client to the cloud tier
//!
//! The snapshot is serialized once; the signature covers exactly those bytes
//! and the same buffer is sent as the body. Transport failures and non-2xx
//! responses both come back as [`ForwardResult::Upstream`]. There are no
//! automatic retries: a caller that retries gets a fresh nonce from the next
//! `forward` call.
//!
//! Dropping the returned future aborts the in-flight request.

use std::time::Duration;

use axum::http::StatusCode;
use hmac_auth::{RequestSigner, SecretConfig, SecretResolver, SignerError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{debug, error, warn};
use types::source::is_blank;
use types::Snapshot;

use crate::config::ConnectorSettings;

#[derive(Debug, Error)]
pub enum ForwarderError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Outcome of one forward attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardResult {
    Accepted,
    /// The snapshot itself cannot be forwarded
    InvalidSnapshot(String),
    /// Local configuration problem (secret, base URL)
    Misconfigured(String),
    /// Cloud tier unreachable or answered non-2xx
    Upstream { status: Option<u16>, message: String },
}

impl ForwardResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ForwardResult::Accepted)
    }

    /// HTTP status the connector answers with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForwardResult::Accepted => StatusCode::ACCEPTED,
            ForwardResult::InvalidSnapshot(_) => StatusCode::BAD_REQUEST,
            ForwardResult::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ForwardResult::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

pub struct CloudForwarder {
    client: Client,
    /// `None` when the configured base URL is unusable
    endpoint: Option<Url>,
    signer: RequestSigner,
}

impl CloudForwarder {
    pub fn new(settings: &ConnectorSettings, outbound: &SecretConfig) -> Result<Self, ForwarderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.forward_timeout_secs.max(1)))
            .build()?;

        let endpoint = snapshot_endpoint(&settings.cloud_api_base_url, &settings.snapshot_path);
        if endpoint.is_none() {
            warn!(
                base_url = %settings.cloud_api_base_url,
                "Cloud API base URL is invalid; forwarding will fail"
            );
        }

        Ok(Self {
            client,
            endpoint,
            signer: RequestSigner::new(SecretResolver::new(outbound)),
        })
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    pub async fn forward(&self, snapshot: &Snapshot) -> ForwardResult {
        if is_blank(&snapshot.source_id) {
            return ForwardResult::InvalidSnapshot("Snapshot sourceId is required".to_string());
        }
        let Some(endpoint) = self.endpoint.clone() else {
            return ForwardResult::Misconfigured("Connector cloud API base URL is invalid".to_string());
        };

        let body = match serde_json::to_vec(snapshot) {
            Ok(body) => body,
            Err(e) => {
                error!(source_id = %snapshot.source_id, error = %e, "Failed to serialize snapshot");
                return ForwardResult::Misconfigured("Snapshot could not be serialized".to_string());
            }
        };

        let headers = match self
            .signer
            .sign(&snapshot.source_id, &body)
            .and_then(|signed| signed.to_header_map())
        {
            Ok(headers) => headers,
            Err(SignerError::SecretNotConfigured { .. }) => {
                return ForwardResult::Misconfigured(
                    "Outbound HMAC secret is not configured for this source".to_string(),
                );
            }
            Err(e @ SignerError::InvalidHeaderValue { .. }) => {
                return ForwardResult::InvalidSnapshot(e.to_string());
            }
        };

        let response = match self
            .client
            .post(endpoint)
            .headers(headers)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(
                    source_id = %snapshot.source_id,
                    class = classify_request_error(&e),
                    error = %e,
                    "Failed to forward snapshot to cloud API"
                );
                return ForwardResult::Upstream {
                    status: None,
                    message: "Cloud API forward request failed".to_string(),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                source_id = %snapshot.source_id,
                body = %detail,
                "Cloud API rejected forwarded snapshot"
            );
            return ForwardResult::Upstream {
                status: Some(status.as_u16()),
                message: format!("Cloud API returned {}", status.as_u16()),
            };
        }

        debug!(source_id = %snapshot.source_id, status = status.as_u16(), "Snapshot forwarded");
        ForwardResult::Accepted
    }
}

/// `{base}{path}`, or `None` unless the base is an absolute http(s) URL.
fn snapshot_endpoint(base_url: &str, path: &str) -> Option<Url> {
    let base = Url::parse(base_url.trim()).ok()?;
    if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
        return None;
    }
    base.join(path).ok()
}

fn classify_request_error(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else if error.is_request() {
        "request"
    } else if error.is_body() {
        "body"
    } else {
        "other"
    }
}
