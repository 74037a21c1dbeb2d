//! Observability for the token subsystem.
//!
//! All instrumentation uses `#[instrument(skip_all)]` with explicit fields.
//! Fields fall into three groups:
//! - **SAFE**: logged as-is (roles, key IDs, error categories)
//! - **HASHED**: SHA-256 prefix for correlation (subjects)
//! - **NEVER**: secrets and tokens

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// Not a security primitive; only keeps raw user names out of log lines while
/// letting related entries be grouped.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}
