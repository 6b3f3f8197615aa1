//! axum middleware enforcing signed requests
//!
//! The body is buffered once (up to a limit), validated, then re-attached so
//! handlers can still extract `Json<T>` from the same bytes. The authenticated
//! source travels as a request extension and is read back with the
//! [`AuthenticatedSource`] extractor.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::error::AuthFailure;
use crate::headers;
use crate::validator::{AuthenticatedSource, RequestValidator};

/// Body limit used when none is configured (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Middleware state: one validator per inbound namespace
#[derive(Debug, Clone)]
pub struct SignatureLayer {
    validator: Arc<RequestValidator>,
    max_body_bytes: usize,
}

impl SignatureLayer {
    pub fn new(validator: Arc<RequestValidator>, max_body_bytes: usize) -> Self {
        let max_body_bytes = if max_body_bytes == 0 {
            DEFAULT_MAX_BODY_BYTES
        } else {
            max_body_bytes
        };
        Self {
            validator,
            max_body_bytes,
        }
    }

    pub fn validator(&self) -> &RequestValidator {
        &self.validator
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

/// Why the middleware refused a request
#[derive(Debug)]
pub enum SignatureRejection {
    Unauthorized(AuthFailure),
    PayloadTooLarge,
    /// Handler expected an authenticated source but the middleware was not installed
    MissingLayer,
}

impl IntoResponse for SignatureRejection {
    fn into_response(self) -> Response {
        match self {
            SignatureRejection::Unauthorized(failure) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_hmac",
                    "reason": failure.reason(),
                    "detail": failure.to_string(),
                })),
            )
                .into_response(),
            SignatureRejection::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({
                    "error": "payload_too_large",
                    "message": "Request body exceeds the configured limit",
                })),
            )
                .into_response(),
            SignatureRejection::MissingLayer => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Internal server error",
                })),
            )
                .into_response(),
        }
    }
}

/// Signature-checking middleware, install with
/// `axum::middleware::from_fn_with_state(layer, require_signature)`.
pub async fn require_signature(
    State(layer): State<SignatureLayer>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match to_bytes(body, layer.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            warn!(
                path = %parts.uri.path(),
                limit = layer.max_body_bytes,
                "Rejected request body over limit"
            );
            return SignatureRejection::PayloadTooLarge.into_response();
        }
    };

    match layer.validator.validate(&parts.headers, &bytes) {
        Ok(source) => {
            parts.extensions.insert(source);
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Err(failure) => {
            warn!(
                path = %parts.uri.path(),
                source_id = parts
                    .headers
                    .get(headers::SOURCE_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or(""),
                reason = failure.reason(),
                "HMAC validation failed"
            );
            SignatureRejection::Unauthorized(failure).into_response()
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedSource
where
    S: Send + Sync,
{
    type Rejection = SignatureRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSource>()
            .cloned()
            .ok_or_else(|| {
                error!(path = %parts.uri.path(), "Signed route is missing the signature middleware");
                SignatureRejection::MissingLayer
            })
    }
}
