//! PEM framing for exportable public keys
//!
//! The bridge exports public keys as standard `PUBLIC KEY` PEM blocks:
//! base64 of the SubjectPublicKeyInfo DER, wrapped at 64 characters per
//! line, with no trailing newline after the footer.

use base64::Engine;

use crate::error::{StoreError, StoreResult};

const HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const FOOTER: &str = "-----END PUBLIC KEY-----";
const LINE_WIDTH: usize = 64;

/// Encode SubjectPublicKeyInfo DER as a `PUBLIC KEY` PEM block.
pub fn encode_public_key_pem(der: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(der);

    let mut out = String::with_capacity(HEADER.len() + FOOTER.len() + b64.len() + b64.len() / LINE_WIDTH + 4);
    out.push_str(HEADER);
    out.push('\n');
    for chunk in b64.as_bytes().chunks(LINE_WIDTH) {
        // chunks of an ASCII string are valid UTF-8
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    out.push_str(FOOTER);
    out
}

/// Parse a `PUBLIC KEY` PEM block back to SubjectPublicKeyInfo DER.
pub fn decode_public_key_pem(pem: &str) -> StoreResult<Vec<u8>> {
    let body = pem.trim();
    let body = body
        .strip_prefix(HEADER)
        .ok_or_else(|| StoreError::CryptoError("missing PEM header".into()))?;
    let body = body
        .strip_suffix(FOOTER)
        .ok_or_else(|| StoreError::CryptoError("missing PEM footer".into()))?;

    let b64: String = body.split_whitespace().collect();
    base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| StoreError::CryptoError(format!("PEM body not base64: {e}")))
}
