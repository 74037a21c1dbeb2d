//! Deterministic secret fixtures for testing
//!
//! All fixtures are deterministic based on seed values.

use chrono::{DateTime, Duration, Utc};
use loft_auth::crypto::SECRET_LENGTH_BYTES;
use loft_auth::repositories::secret_file::SecretRecord;

/// Deterministic 32-byte HMAC secret for `seed`.
///
/// The same seed always produces the same bytes; different seeds never
/// collide.
pub fn test_signing_secret(seed: u8) -> Vec<u8> {
    let mut bytes = vec![0u8; SECRET_LENGTH_BYTES];
    bytes[0] = seed;
    for (i, byte) in bytes.iter_mut().enumerate().skip(1) {
        *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
    }
    bytes
}

/// Secret record for the deterministic secret `seed`, valid from
/// `issued_at` for `lifetime`.
pub fn test_secret_record(
    seed: u8,
    key_id: &str,
    issued_at: DateTime<Utc>,
    lifetime: Duration,
) -> SecretRecord {
    SecretRecord {
        key_id: key_id.to_string(),
        secret: common::jwt::encode_hmac_secret(&test_signing_secret(seed)),
        issued_at,
        valid_until: issued_at + lifetime,
    }
}
