//! Signature codec: canonical payload, HMAC computation and wire encodings
//!
//! Canonical signable bytes are `"{timestamp}.{nonce}." ++ body`, where
//! `timestamp` is the header string exactly as transmitted and `body` is the
//! raw request body. Producers always emit 64 lowercase hex characters;
//! parsers also accept a `sha256=` prefix and base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::secrets::Secret;

type HmacSha256 = Hmac<Sha256>;

/// Raw HMAC-SHA256 output length.
pub const SIGNATURE_LEN: usize = 32;

/// Hex-encoded signature length.
pub const HEX_SIGNATURE_LEN: usize = SIGNATURE_LEN * 2;

/// Optional algorithm prefix accepted on input (case-insensitive).
const ALGORITHM_PREFIX: &str = "sha256=";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The provided signature is neither hex nor base64.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureFormatError {
    #[error("signature is not valid hex")]
    InvalidHex,

    #[error("signature is neither a 64-character hex digest nor base64")]
    Unrecognized,
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Canonical signable bytes.
pub fn canonical_payload(timestamp: &str, nonce: &str, body: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(timestamp.len() + nonce.len() + body.len() + 2);
    payload.extend_from_slice(timestamp.as_bytes());
    payload.push(b'.');
    payload.extend_from_slice(nonce.as_bytes());
    payload.push(b'.');
    payload.extend_from_slice(body);
    payload
}

/// HMAC-SHA256 over the canonical payload.
pub fn compute(secret: &Secret, timestamp: &str, nonce: &str, body: &[u8]) -> [u8; SIGNATURE_LEN] {
    // HMAC accepts keys of any length; new_from_slice cannot fail here.
    let mut mac = HmacSha256::new_from_slice(secret.expose())
        .expect("HMAC can take key of any size");
    mac.update(&canonical_payload(timestamp, nonce, body));

    let mut signature = [0u8; SIGNATURE_LEN];
    signature.copy_from_slice(&mac.finalize().into_bytes());
    signature
}

/// Transport encoding: 64 lowercase hex characters, no prefix.
pub fn encode_hex(signature: &[u8; SIGNATURE_LEN]) -> String {
    hex::encode(signature)
}

// ---------------------------------------------------------------------------
// Parsing & comparison
// ---------------------------------------------------------------------------

/// Decode an `X-Signature` header value.
///
/// Order: strip an optional `sha256=` prefix, hex-decode when the remainder is
/// exactly 64 hex digits, otherwise try standard base64. The decoded length is
/// not checked here; [`verify`] treats a wrong length as a mismatch.
pub fn parse(raw: &str) -> Result<Vec<u8>, SignatureFormatError> {
    let mut value = raw.trim();
    if let Some(prefix) = value.get(..ALGORITHM_PREFIX.len()) {
        if prefix.eq_ignore_ascii_case(ALGORITHM_PREFIX) {
            value = value[ALGORITHM_PREFIX.len()..].trim();
        }
    }

    if is_hex_digest(value) {
        return hex::decode(value).map_err(|_| SignatureFormatError::InvalidHex);
    }

    STANDARD
        .decode(value)
        .map_err(|_| SignatureFormatError::Unrecognized)
}

/// Constant-time comparison; any length other than 32 bytes is a mismatch.
pub fn verify(expected: &[u8; SIGNATURE_LEN], provided: &[u8]) -> bool {
    if provided.len() != SIGNATURE_LEN {
        return false;
    }
    expected.as_slice().ct_eq(provided).into()
}

fn is_hex_digest(value: &str) -> bool {
    value.len() == HEX_SIGNATURE_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4231 test case 2: key "Jefe", data "what do ya want for nothing?"
    const RFC4231_KEY: &str = "Jefe";
    const RFC4231_MAC: &str = "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843";

    #[test]
    fn test_canonical_payload_layout() {
        let payload = canonical_payload("1700000000", "n1", br#"{"a":1}"#);
        assert_eq!(payload, br#"1700000000.n1.{"a":1}"#.to_vec());
    }

    #[test]
    fn test_hmac_matches_reference_vector() {
        let mut mac = HmacSha256::new_from_slice(RFC4231_KEY.as_bytes()).unwrap();
        mac.update(b"what do ya want for nothing?");
        assert_eq!(hex::encode(mac.finalize().into_bytes()), RFC4231_MAC);
    }

    #[test]
    fn test_compute_is_deterministic_and_key_dependent() {
        let body = br#"{"sourceId":"acct-1"}"#;
        let a = compute(&Secret::new("s3cr3t"), "1700000000", "n1", body);
        let b = compute(&Secret::new("s3cr3t"), "1700000000", "n1", body);
        let c = compute(&Secret::new("other"), "1700000000", "n1", body);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_encode_hex_is_lowercase_64() {
        let sig = compute(&Secret::new("k"), "1", "n", b"");
        let encoded = encode_hex(&sig);
        assert_eq!(encoded.len(), HEX_SIGNATURE_LEN);
        assert_eq!(encoded, encoded.to_lowercase());
    }

    #[test]
    fn test_parse_hex_any_case_and_prefix() {
        let sig = compute(&Secret::new("k"), "1", "n", b"body");
        let hex_sig = encode_hex(&sig);

        assert_eq!(parse(&hex_sig).unwrap(), sig.to_vec());
        assert_eq!(parse(&hex_sig.to_uppercase()).unwrap(), sig.to_vec());
        assert_eq!(parse(&format!("sha256={}", hex_sig)).unwrap(), sig.to_vec());
        assert_eq!(parse(&format!("SHA256= {} ", hex_sig)).unwrap(), sig.to_vec());
    }

    #[test]
    fn test_parse_base64() {
        let sig = compute(&Secret::new("k"), "1", "n", b"body");
        let encoded = STANDARD.encode(sig);
        assert_eq!(parse(&encoded).unwrap(), sig.to_vec());
        assert_eq!(parse(&format!("sha256={}", encoded)).unwrap(), sig.to_vec());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse("not a signature!"), Err(SignatureFormatError::Unrecognized));
        // 64 chars but not all hex, and not base64 either
        let almost_hex = format!("{}!!", "a".repeat(62));
        assert!(parse(&almost_hex).is_err());
    }

    #[test]
    fn test_parse_short_hex_goes_through_base64() {
        // 8 hex chars are valid base64 too; they decode, then fail verify on length
        let decoded = parse("deadbeef").unwrap();
        assert_ne!(decoded.len(), SIGNATURE_LEN);
    }

    #[test]
    fn test_verify_rejects_length_mismatch() {
        let sig = compute(&Secret::new("k"), "1", "n", b"");
        assert!(verify(&sig, &sig));
        assert!(!verify(&sig, &sig[..31]));
        let mut longer = sig.to_vec();
        longer.push(0);
        assert!(!verify(&sig, &longer));
        assert!(!verify(&sig, &[]));
    }

    #[test]
    fn test_verify_detects_single_bit_flip() {
        let sig = compute(&Secret::new("k"), "1", "n", b"");
        let mut flipped = sig;
        flipped[17] ^= 0x01;
        assert!(!verify(&sig, &flipped));
    }
}
