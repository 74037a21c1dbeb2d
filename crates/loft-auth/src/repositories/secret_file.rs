//! Durable storage for the signing secret.
//!
//! The record is a small JSON document read only by this process (and its
//! restarts). Writes go to a temp file in the same directory which is synced
//! and then renamed over the target, so a crash never leaves a truncated
//! record behind.

use crate::errors::AuthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Current record layout version.
pub const SECRET_FILE_VERSION: u32 = 1;

/// Persisted signing secrets: the current one and, after a rotation, the
/// one it replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSecrets {
    pub version: u32,
    pub current: SecretRecord,
    #[serde(default)]
    pub previous: Option<SecretRecord>,
}

/// One signing secret in transport encoding.
///
/// `secret` is standard base64 of the raw key bytes. Debug output redacts it.
#[derive(Clone, Serialize, Deserialize)]
pub struct SecretRecord {
    pub key_id: String,
    pub secret: String,
    pub issued_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("key_id", &self.key_id)
            .field("secret", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("valid_until", &self.valid_until)
            .finish()
    }
}

/// Read the persisted secrets.
///
/// Returns `Ok(None)` when no file exists. Unreadable or unparseable content
/// is an error; the caller decides whether that is fatal.
pub fn read_secrets(path: &Path) -> Result<Option<PersistedSecrets>, AuthError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AuthError::Persistence(format!(
                "Failed to read secret file: {}",
                e
            )))
        }
    };

    let secrets: PersistedSecrets = serde_json::from_str(&contents)
        .map_err(|e| AuthError::Persistence(format!("Failed to parse secret file: {}", e)))?;

    if secrets.version != SECRET_FILE_VERSION {
        return Err(AuthError::Persistence(format!(
            "Unsupported secret file version: {}",
            secrets.version
        )));
    }

    Ok(Some(secrets))
}

/// Atomically replace the secret file with `secrets`.
pub fn write_secrets(path: &Path, secrets: &PersistedSecrets) -> Result<(), AuthError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| AuthError::Persistence(format!("Failed to create temp file: {}", e)))?;

    serde_json::to_writer_pretty(&mut tmp, secrets)
        .map_err(|e| AuthError::Persistence(format!("Failed to serialize secrets: {}", e)))?;
    tmp.write_all(b"\n")
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| AuthError::Persistence(format!("Failed to flush temp file: {}", e)))?;

    tmp.persist(path)
        .map_err(|e| AuthError::Persistence(format!("Failed to replace secret file: {}", e.error)))?;

    sync_dir(dir);

    Ok(())
}

/// Make the rename itself durable. Best effort.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(dir_handle) = std::fs::File::open(dir) {
        let _ = dir_handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
