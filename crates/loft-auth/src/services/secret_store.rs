//! Signing secret lifecycle.
//!
//! The store owns the HMAC secret used to sign tokens. A secret is valid for
//! one token lifetime from the moment it is generated; once that window has
//! elapsed the next caller of [`SecretStore::ensure_fresh`] rotates it. The
//! secret it replaces stays acceptable for validation for one more token
//! lifetime, so tokens signed just before a rotation keep working until they
//! expire on their own.
//!
//! All reads and rotations go through one mutex. Readers take a snapshot of
//! `Arc` handles and release the lock before doing any crypto work.

use crate::clock::Clock;
use crate::config::TokenSettings;
use crate::crypto::{self, EntropySource, SECRET_LENGTH_BYTES};
use crate::errors::AuthError;
use crate::observability::metrics;
use crate::repositories::secret_file::{self, PersistedSecrets, SecretRecord, SECRET_FILE_VERSION};
use chrono::{DateTime, Duration, Utc};
use common::secret::{ExposeSecret, SecretBox};
use ring::rand::SystemRandom;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::instrument;

/// Build the key id for a secret generated at `issued_at`.
///
/// Millisecond resolution, so two secrets never share an id unless they were
/// generated within the same millisecond.
pub fn key_id_for(issued_at: DateTime<Utc>) -> String {
    format!("loft-{}", issued_at.format("%Y%m%dT%H%M%S%3fZ"))
}

/// One HMAC signing secret together with its validity window.
#[derive(Debug)]
pub struct SigningSecret {
    key_id: String,
    value: SecretBox<Vec<u8>>,
    issued_at: DateTime<Utc>,
    valid_until: DateTime<Utc>,
}

impl SigningSecret {
    /// Generate a new secret valid from `now` for `lifetime`.
    pub fn generate(
        now: DateTime<Utc>,
        lifetime: Duration,
        rng: &dyn EntropySource,
    ) -> Result<Self, AuthError> {
        let valid_until = now.checked_add_signed(lifetime).ok_or_else(|| {
            AuthError::Crypto("Signing secret validity window is out of range".to_string())
        })?;
        Ok(Self {
            key_id: key_id_for(now),
            value: crypto::generate_signing_secret(rng)?,
            issued_at: now,
            valid_until,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn valid_until(&self) -> DateTime<Utc> {
        self.valid_until
    }

    /// Raw key bytes for signing or verification.
    pub fn expose_value(&self) -> &[u8] {
        self.value.expose_secret()
    }

    /// True once `now` has reached the end of the validity window.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.valid_until
    }

    /// Rebuild a secret from its stored form. The stored window must be
    /// non-empty and no longer than `lifetime`.
    fn from_record(record: &SecretRecord, lifetime: Duration) -> Result<Self, AuthError> {
        if record.key_id.is_empty() {
            return Err(AuthError::Persistence("Secret record has an empty key id".to_string()));
        }

        let bytes = common::jwt::decode_hmac_secret(&record.secret).map_err(|e| {
            AuthError::Persistence(format!("Secret record is not valid base64: {}", e))
        })?;

        if bytes.len() != SECRET_LENGTH_BYTES {
            return Err(AuthError::Persistence(format!(
                "Secret record has {} bytes (expected {})",
                bytes.len(),
                SECRET_LENGTH_BYTES
            )));
        }

        if record.valid_until <= record.issued_at {
            return Err(AuthError::Persistence(
                "Secret record validity window is empty".to_string(),
            ));
        }

        if record.valid_until.signed_duration_since(record.issued_at) > lifetime {
            return Err(AuthError::Persistence(format!(
                "Secret record validity window exceeds {} minutes",
                lifetime.num_minutes()
            )));
        }

        Ok(Self {
            key_id: record.key_id.clone(),
            value: SecretBox::new(Box::new(bytes)),
            issued_at: record.issued_at,
            valid_until: record.valid_until,
        })
    }

    fn to_record(&self) -> SecretRecord {
        SecretRecord {
            key_id: self.key_id.clone(),
            secret: common::jwt::encode_hmac_secret(self.expose_value()),
            issued_at: self.issued_at,
            valid_until: self.valid_until,
        }
    }
}

/// Secrets read back from disk.
#[derive(Debug)]
pub struct LoadedSecrets {
    pub current: SigningSecret,
    pub previous: Option<SigningSecret>,
}

/// Snapshot of everything a validator needs for one validation.
#[derive(Debug, Clone)]
pub struct ValidationParameters {
    pub issuer: String,
    pub audience: String,
    /// Accepted secrets, current first.
    pub keys: Vec<Arc<SigningSecret>>,
}

#[derive(Debug)]
struct StoreState {
    current: Arc<SigningSecret>,
    previous: Option<Arc<SigningSecret>>,
}

/// Owner of the signing secret.
pub struct SecretStore {
    path: PathBuf,
    settings: TokenSettings,
    clock: Arc<dyn Clock>,
    entropy: Arc<dyn EntropySource>,
    state: Mutex<StoreState>,
}

impl SecretStore {
    /// Open the store backed by `path`.
    ///
    /// A fresh persisted secret is reused as-is. A stale one is rotated
    /// immediately and kept as the previous secret. A missing or unusable file
    /// results in a newly generated secret. Only an entropy failure is fatal.
    pub fn open(
        path: impl Into<PathBuf>,
        settings: TokenSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AuthError> {
        Self::open_with_entropy(path, settings, clock, Arc::new(SystemRandom::new()))
    }

    /// [`SecretStore::open`] with an explicit source of key material.
    #[instrument(skip_all)]
    pub fn open_with_entropy(
        path: impl Into<PathBuf>,
        settings: TokenSettings,
        clock: Arc<dyn Clock>,
        entropy: Arc<dyn EntropySource>,
    ) -> Result<Self, AuthError> {
        let path = path.into();
        let now = clock.now();

        let loaded = Self::load(&path, settings.lifetime).and_then(|loaded| {
            if loaded.current.issued_at() > now {
                tracing::warn!(
                    target: "loft_auth.store",
                    key_id = %loaded.current.key_id(),
                    issued_at = %loaded.current.issued_at(),
                    "Ignoring persisted signing secret issued in the future"
                );
                return None;
            }
            Some(LoadedSecrets {
                previous: loaded.previous.filter(|p| p.issued_at() <= now),
                current: loaded.current,
            })
        });

        let state = match loaded {
            Some(loaded) if !loaded.current.is_stale_at(now) => {
                tracing::info!(
                    target: "loft_auth.store",
                    key_id = %loaded.current.key_id(),
                    valid_until = %loaded.current.valid_until(),
                    "Reusing persisted signing secret"
                );
                StoreState {
                    current: Arc::new(loaded.current),
                    previous: loaded
                        .previous
                        .map(Arc::new)
                        .filter(|p| accepts_previous(p, now, &settings)),
                }
            }
            Some(loaded) => {
                let stale = Arc::new(loaded.current);
                let current = Arc::new(generate_rotated(now, &settings, entropy.as_ref())?);
                tracing::info!(
                    target: "loft_auth.store",
                    old_key_id = %stale.key_id(),
                    new_key_id = %current.key_id(),
                    "Persisted signing secret is stale, rotated on startup"
                );
                metrics::record_key_rotation("success");
                let previous = Some(stale).filter(|p| accepts_previous(p, now, &settings));
                let state = StoreState { current, previous };
                persist_or_warn(&path, &state);
                state
            }
            None => {
                let current = Arc::new(generate_rotated(now, &settings, entropy.as_ref())?);
                tracing::info!(
                    target: "loft_auth.store",
                    key_id = %current.key_id(),
                    "Generated new signing secret"
                );
                metrics::record_key_rotation("success");
                let state = StoreState {
                    current,
                    previous: None,
                };
                persist_or_warn(&path, &state);
                state
            }
        };

        metrics::set_active_signing_keys(1 + usize::from(state.previous.is_some()));

        Ok(Self {
            path,
            settings,
            clock,
            entropy,
            state: Mutex::new(state),
        })
    }

    /// Read the persisted secrets, if there are usable ones.
    ///
    /// Any problem with the file is logged and reported as `None`, as is a
    /// record whose window is longer than `lifetime`. A bad previous entry is
    /// dropped without discarding the current one.
    pub fn load(path: &Path, lifetime: Duration) -> Option<LoadedSecrets> {
        let persisted = match secret_file::read_secrets(path) {
            Ok(Some(persisted)) => persisted,
            Ok(None) => {
                tracing::debug!(target: "loft_auth.store", "No persisted signing secret");
                return None;
            }
            Err(e) => {
                tracing::warn!(target: "loft_auth.store", error = %e, "Ignoring unreadable secret file");
                return None;
            }
        };

        let current = match SigningSecret::from_record(&persisted.current, lifetime) {
            Ok(secret) => secret,
            Err(e) => {
                tracing::warn!(target: "loft_auth.store", error = %e, "Ignoring invalid persisted signing secret");
                return None;
            }
        };

        let previous = persisted
            .previous
            .as_ref()
            .and_then(|record| match SigningSecret::from_record(record, lifetime) {
                Ok(secret) => Some(secret),
                Err(e) => {
                    tracing::warn!(target: "loft_auth.store", error = %e, "Dropping invalid previous signing secret");
                    None
                }
            });

        Some(LoadedSecrets { current, previous })
    }

    /// True when `secret` has reached the end of its validity window.
    pub fn is_stale(&self, secret: &SigningSecret) -> bool {
        secret.is_stale_at(self.clock.now())
    }

    /// Return the current secret, rotating it first if it is stale.
    ///
    /// Staleness check and rotation happen under one lock, so concurrent
    /// callers observe exactly one rotation. A failed write is logged and
    /// counted; the new secret is still used from memory.
    pub fn ensure_fresh(&self) -> Result<Arc<SigningSecret>, AuthError> {
        self.ensure_fresh_at(self.clock.now())
    }

    /// [`SecretStore::ensure_fresh`] judged at `now`.
    ///
    /// Callers that go on to stamp claims pass the same instant, so a secret
    /// fresh at `now` never signs a token issued after its window.
    #[instrument(skip_all)]
    pub fn ensure_fresh_at(&self, now: DateTime<Utc>) -> Result<Arc<SigningSecret>, AuthError> {
        let mut state = self.lock_state();

        if !state.current.is_stale_at(now) {
            return Ok(Arc::clone(&state.current));
        }

        let generated = SigningSecret::generate(now, self.settings.lifetime, self.entropy.as_ref());
        let current = match generated {
            Ok(secret) => Arc::new(secret),
            Err(e) => {
                metrics::record_key_rotation("error");
                return Err(e);
            }
        };

        let old = std::mem::replace(&mut state.current, Arc::clone(&current));
        tracing::info!(
            target: "loft_auth.store",
            old_key_id = %old.key_id(),
            new_key_id = %current.key_id(),
            valid_until = %current.valid_until(),
            "Rotated signing secret"
        );
        state.previous = Some(old).filter(|p| accepts_previous(p, now, &self.settings));

        persist_or_warn(&self.path, &state);
        metrics::record_key_rotation("success");
        metrics::set_active_signing_keys(1 + usize::from(state.previous.is_some()));

        Ok(current)
    }

    /// Write the current state to disk.
    pub fn persist(&self) -> Result<(), AuthError> {
        let state = self.lock_state();
        persist_state(&self.path, &state)
    }

    /// Snapshot of issuer, audience and the secrets accepted right now.
    ///
    /// The current secret is always included, even when stale, so tokens it
    /// signed stay verifiable until the next rotation.
    pub fn current_parameters(&self) -> ValidationParameters {
        let (keys, previous_accepted) = {
            let state = self.lock_state();
            let now = self.clock.now();
            let mut keys = vec![Arc::clone(&state.current)];
            let previous = state
                .previous
                .as_ref()
                .filter(|p| accepts_previous(p, now, &self.settings));
            if let Some(previous) = previous {
                keys.push(Arc::clone(previous));
            }
            (keys, previous.is_some())
        };

        metrics::set_active_signing_keys(1 + usize::from(previous_accepted));

        ValidationParameters {
            issuer: self.settings.issuer.clone(),
            audience: self.settings.audience.clone(),
            keys,
        }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A replaced secret stays acceptable until every token it could have signed
/// has expired.
fn accepts_previous(previous: &SigningSecret, now: DateTime<Utc>, settings: &TokenSettings) -> bool {
    previous
        .valid_until
        .checked_add_signed(settings.lifetime)
        .is_some_and(|grace_end| now < grace_end)
}

fn generate_rotated(
    now: DateTime<Utc>,
    settings: &TokenSettings,
    entropy: &dyn EntropySource,
) -> Result<SigningSecret, AuthError> {
    SigningSecret::generate(now, settings.lifetime, entropy).inspect_err(|_| {
        metrics::record_key_rotation("error");
    })
}

fn persist_state(path: &Path, state: &StoreState) -> Result<(), AuthError> {
    let persisted = PersistedSecrets {
        version: SECRET_FILE_VERSION,
        current: state.current.to_record(),
        previous: state.previous.as_ref().map(|p| p.to_record()),
    };
    secret_file::write_secrets(path, &persisted)
}

fn persist_or_warn(path: &Path, state: &StoreState) {
    if let Err(e) = persist_state(path, state) {
        tracing::warn!(
            target: "loft_auth.store",
            error = %e,
            key_id = %state.current.key_id(),
            "Failed to persist signing secret, continuing with in-memory secret"
        );
        metrics::record_secret_persist_failure();
    }
}
