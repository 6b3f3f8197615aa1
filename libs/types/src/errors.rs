//! Error types for snapshot ingestion
//!
//! These are payload/header consistency failures raised after a request has
//! already been authenticated. They are client errors, distinct from
//! authentication failures.

use thiserror::Error;

/// Ingestion validation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("sourceId is required")]
    MissingSourceId,

    #[error("sourceId '{body}' does not match authenticated source '{authenticated}'")]
    SourceMismatch { body: String, authenticated: String },
}

impl ValidationError {
    /// Name of the offending payload field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingSourceId | ValidationError::SourceMismatch { .. } => "sourceId",
        }
    }
}
