//! Webhook signature verification.
//!
//! The processor signs each delivery over the exact raw body bytes:
//! the header carries `t=<unix_ts>,v1=<hex mac>` where the MAC is
//! HMAC-SHA256 of `"{t}.{body}"` under the shared webhook secret. The body
//! must therefore reach verification unparsed — deserializing first and
//! re-serializing would change the byte sequence and break the check.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signature timestamp, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: u64 = 300;

/// Compute the hex-encoded HMAC-SHA256 of `message` under `secret`.
fn compute_mac(secret: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Build a signature header for `body` at `timestamp`.
///
/// This is what the processor computes on its side; exposed so tests and
/// outbound deliveries can produce valid headers.
pub fn sign_payload(secret: &[u8], body: &[u8], timestamp: u64) -> String {
    let mut message = timestamp.to_string().into_bytes();
    message.push(b'.');
    message.extend_from_slice(body);
    format!("t={timestamp},v1={}", compute_mac(secret, &message))
}

/// Verify a signature header against the raw request body.
///
/// Checks the timestamp against [`SIGNATURE_TOLERANCE_SECS`] and compares the
/// MAC in constant time. Returns the specific failure so callers can log it;
/// the payload must not be trusted unless this returns `Ok`.
pub fn verify_signature(
    secret: &[u8],
    raw_body: &[u8],
    header: &str,
) -> Result<(), SignatureError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    verify_signature_at(secret, raw_body, header, now, SIGNATURE_TOLERANCE_SECS)
}

/// Verification against an explicit clock, for tests and custom tolerances.
pub fn verify_signature_at(
    secret: &[u8],
    raw_body: &[u8],
    header: &str,
    now: u64,
    tolerance_secs: u64,
) -> Result<(), SignatureError> {
    let (timestamp, provided) = parse_header(header)?;

    if now.abs_diff(timestamp) > tolerance_secs {
        return Err(SignatureError::StaleTimestamp);
    }

    let mut message = timestamp.to_string().into_bytes();
    message.push(b'.');
    message.extend_from_slice(raw_body);

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(&message);

    // Decode hex first - if invalid, compare against zeros to maintain constant-time
    let expected = hex::decode(&provided).unwrap_or_else(|_| vec![0u8; 32]);

    // hmac crate's verify_slice uses constant-time comparison
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Parse `t=<ts>,v1=<hex>` into its parts.
fn parse_header(header: &str) -> Result<(u64, String), SignatureError> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => {
                timestamp = Some(v.parse::<u64>().map_err(|_| {
                    SignatureError::MalformedHeader("non-numeric timestamp".to_string())
                })?);
            }
            Some(("v1", v)) => signature = Some(v.to_string()),
            // Stripe may add other schemes (v0); ignore them.
            _ => {}
        }
    }

    match (timestamp, signature) {
        (Some(t), Some(s)) => Ok((t, s)),
        (None, _) => Err(SignatureError::MalformedHeader(
            "missing timestamp".to_string(),
        )),
        (_, None) => Err(SignatureError::MalformedHeader(
            "missing v1 signature".to_string(),
        )),
    }
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().fold(String::new(), |mut s, b| {
            use std::fmt::Write;
            let _ = write!(s, "{b:02x}");
            s
        })
    }

    pub fn decode(s: &str) -> Result<Vec<u8>, ()> {
        if s.len() % 2 != 0 || !s.is_ascii() {
            return Err(());
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| ()))
            .collect()
    }
}
