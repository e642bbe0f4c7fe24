//! Signature algorithm and verification for signed event publishing.
//!
//! The gateway authenticates a published event by an HMAC-SHA256 over the
//! canonical JSON of the request body. The wire format for the header is the
//! lowercase hex digest:
//!
//! ```text
//! x-aibbar-signature: {hex_hmac_sha256}
//! ```
//!
//! Canonical JSON sorts object keys at every depth and carries no
//! whitespace, so the same payload signs identically no matter how its maps
//! were built. Numbers are printed as JavaScript prints them (`1.0` is `1`,
//! `1e21` is `1e+21`) since the gateway re-serializes the body it received
//! before checking the signature.

use serde_json::Value;

/// Header name for the HMAC signature.
pub const SIGNATURE_HEADER: &str = "x-aibbar-signature";

/// Header name for API key authentication.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid signature")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

// ---------------------------------------------------------------------------
// Canonical JSON
// ---------------------------------------------------------------------------

/// Serialize `value` with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // A JSON string always serializes.
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => out.push_str(&js_number(f)),
            None => out.push_str(&n.to_string()),
        },
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Render a finite double the way ECMAScript `Number::toString` does.
fn js_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    if value < 0.0 {
        return format!("-{}", js_number(-value));
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345e3`.
    let sci = format!("{value:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let n = exponent + 1;

    if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let e = n - 1;
        let sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", e.abs())
        }
    }
}

// ---------------------------------------------------------------------------
// Signing / verification
// ---------------------------------------------------------------------------

fn hmac_key(secret: &[u8]) -> ring::hmac::Key {
    ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret)
}

/// Sign raw bytes: lowercase hex of `HMAC-SHA256(data, secret)`.
pub fn sign_bytes(data: &[u8], secret: &[u8]) -> String {
    let tag = ring::hmac::sign(&hmac_key(secret), data);
    hex::encode(tag.as_ref())
}

/// Sign a payload: lowercase hex of
/// `HMAC-SHA256(canonical_json(payload), secret)`.
pub fn sign_payload(payload: &Value, secret: &[u8]) -> String {
    sign_bytes(canonical_json(payload).as_bytes(), secret)
}

/// Verify a hex signature over raw bytes in constant time.
pub fn verify_bytes(data: &[u8], signature_hex: &str, secret: &[u8]) -> Result<(), SignatureError> {
    let signature = hex::decode(signature_hex).map_err(|_| SignatureError::InvalidHex)?;
    ring::hmac::verify(&hmac_key(secret), data, &signature)?;
    Ok(())
}

/// Verify a hex signature produced by [`sign_payload`].
pub fn verify_payload(
    payload: &Value,
    signature_hex: &str,
    secret: &[u8],
) -> Result<(), SignatureError> {
    verify_bytes(canonical_json(payload).as_bytes(), signature_hex, secret)
}
