//! Secret file helpers for rotation and restart tests
//!
//! Write the on-disk record directly so tests can start from a fresh, stale
//! or corrupt secret without waiting for real time to pass.

use crate::crypto_fixtures::test_secret_record;
use chrono::{DateTime, Duration, Utc};
use loft_auth::repositories::secret_file::{
    read_secrets, write_secrets, PersistedSecrets, SECRET_FILE_VERSION,
};
use std::path::Path;

/// Write a secret file whose current secret is the deterministic secret
/// `seed`, issued at `issued_at`.
///
/// # Example
/// ```rust,ignore
/// // A secret that went stale one minute before the harness clock starts
/// write_secret_file(&path, 1, TEST_KEY_ID_1, test_start() - Duration::minutes(61), lifetime)?;
/// ```
pub fn write_secret_file(
    path: &Path,
    seed: u8,
    key_id: &str,
    issued_at: DateTime<Utc>,
    lifetime: Duration,
) -> Result<(), anyhow::Error> {
    let secrets = PersistedSecrets {
        version: SECRET_FILE_VERSION,
        current: test_secret_record(seed, key_id, issued_at, lifetime),
        previous: None,
    };
    write_secrets(path, &secrets).map_err(|e| anyhow::anyhow!("Failed to write secret file: {}", e))
}

/// Overwrite the secret file with bytes that are not a valid record.
pub fn write_corrupt_secret_file(path: &Path) -> Result<(), anyhow::Error> {
    std::fs::write(path, b"{\"version\": 1, \"current\": ")?;
    Ok(())
}

/// Key ids of the persisted current and previous secrets.
pub fn persisted_key_ids(path: &Path) -> Result<(String, Option<String>), anyhow::Error> {
    let secrets = read_secrets(path)
        .map_err(|e| anyhow::anyhow!("Failed to read secret file: {}", e))?
        .ok_or_else(|| anyhow::anyhow!("Secret file does not exist"))?;
    Ok((secrets.current.key_id, secrets.previous.map(|p| p.key_id)))
}
