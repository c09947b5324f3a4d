//! Tally webhook signature verification.
//!
//! Tally signs each delivery with HMAC-SHA256 over the raw request body and
//! sends the base64-encoded digest in the `tally-signature` header.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature of the request body.
pub const SIGNATURE_HEADER: &str = "tally-signature";

/// Compute the base64 HMAC-SHA256 signature of `body` under `secret`.
pub fn compute_signature(secret: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SignatureError(e.to_string()))?;
    mac.update(body);

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verify a Tally webhook signature.
///
/// # Arguments
///
/// * `secret` - The form's webhook signing secret
/// * `body` - The request body exactly as received
/// * `signature` - The `tally-signature` header value, if present
///
/// # Returns
///
/// `Ok(true)` only when the signature matches. A missing, empty or wrong
/// signature is `Ok(false)`; `Err` means the MAC could not be computed.
pub fn verify_tally_signature(
    secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> Result<bool, SignatureError> {
    let signature = match signature.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => {
            warn!(body_length = body.len(), "tally_signature_missing");
            return Ok(false);
        }
    };

    let expected = compute_signature(secret, body)?;

    let valid = constant_time_compare(expected.as_bytes(), signature.as_bytes());

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            "tally_signature_mismatch"
        );
    }

    Ok(valid)
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}
