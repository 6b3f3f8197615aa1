//! Authentication failure taxonomy
//!
//! Every variant maps to an unauthorized response. Messages never contain
//! secret material and say no more about configured sources than
//! "unknown source".

use thiserror::Error;

/// Why a signed request was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("missing or invalid {0} header")]
    MissingOrInvalidHeader(&'static str),

    #[error("unknown source or missing shared secret configuration")]
    UnknownSource,

    #[error("invalid X-Timestamp format")]
    BadTimestampFormat,

    #[error("X-Timestamp is out of range")]
    TimestampOutOfRange,

    #[error("request timestamp drift exceeded")]
    ClockSkewExceeded,

    #[error("X-Signature format is invalid")]
    BadSignatureFormat,

    #[error("signature verification failed")]
    SignatureMismatch,

    #[error("nonce replay detected")]
    NonceReplay,
}

impl AuthFailure {
    /// Machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            AuthFailure::MissingOrInvalidHeader(_) => "missing_or_invalid_header",
            AuthFailure::UnknownSource => "unknown_source",
            AuthFailure::BadTimestampFormat => "bad_timestamp_format",
            AuthFailure::TimestampOutOfRange => "timestamp_out_of_range",
            AuthFailure::ClockSkewExceeded => "clock_skew_exceeded",
            AuthFailure::BadSignatureFormat => "bad_signature_format",
            AuthFailure::SignatureMismatch => "signature_mismatch",
            AuthFailure::NonceReplay => "nonce_replay",
        }
    }
}
