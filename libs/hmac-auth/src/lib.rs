//! Request authentication for snapshot submission
//!
//! A symmetric-key, replay-resistant scheme shared by the cloud tier
//! (validating inbound submissions) and the connector tier (validating
//! inbound submissions and signing what it forwards).
//!
//! A signed request carries four headers:
//! - `X-Source-Id`: the submitting source
//! - `X-Timestamp`: Unix seconds, UTC
//! - `X-Nonce`: single-use token, unique per source within the freshness window
//! - `X-Signature`: `HMAC-SHA256(secret, "{timestamp}.{nonce}.{body}")`,
//!   lowercase hex, optionally prefixed `sha256=` (base64 accepted on input)
//!
//! # Modules
//! - `headers`: Header names
//! - `secrets`: Per-source / shared secret resolution
//! - `codec`: Canonical payload, HMAC computation, signature parsing
//! - `replay`: Nonce replay guard
//! - `validator`: Server-side validation pipeline
//! - `signer`: Client-side signing
//! - `layer`: axum middleware wrapping the validator
//! - `error`: Authentication failure taxonomy

pub mod headers;
pub mod secrets;
pub mod codec;
pub mod replay;
pub mod validator;
pub mod signer;
pub mod layer;
pub mod error;

pub use error::AuthFailure;
pub use layer::{require_signature, SignatureLayer};
pub use replay::ReplayGuard;
pub use secrets::{Secret, SecretConfig, SecretResolver};
pub use signer::{RequestSigner, SignedHeaders, SignerError};
pub use validator::{AuthenticatedSource, RequestValidator, ValidationConfig};
