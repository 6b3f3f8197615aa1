//! Header names of the signing contract (identical inbound and outbound)

pub const SOURCE_ID: &str = "X-Source-Id";
pub const TIMESTAMP: &str = "X-Timestamp";
pub const NONCE: &str = "X-Nonce";
pub const SIGNATURE: &str = "X-Signature";
