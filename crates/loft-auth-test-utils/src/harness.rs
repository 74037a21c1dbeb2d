//! Test harness around [`AuthService`]
//!
//! Owns a temporary directory for the secret file and a [`ManualClock`]
//! shared by every service instance it builds, so tests can move time and
//! simulate process restarts deterministically.

use crate::test_ids::{test_start, TEST_AUDIENCE, TEST_ISSUER, TEST_LIFETIME_MINUTES};
use chrono::Duration;
use loft_auth::clock::{Clock, ManualClock};
use loft_auth::config::Config;
use loft_auth::AuthService;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Test harness for the token subsystem
///
/// # Example
/// ```rust,ignore
/// let mut harness = TestAuthHarness::new()?;
/// let token = harness.service().issue_token(&alice_admin())?;
///
/// harness.advance(Duration::minutes(30));
/// harness.restart()?;
/// assert!(harness.service().validate_token(&token).is_ok());
/// ```
pub struct TestAuthHarness {
    dir: TempDir,
    clock: Arc<ManualClock>,
    config: Config,
    service: AuthService,
}

impl TestAuthHarness {
    /// Harness with the default 60 minute lifetime and no existing secret file
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::with_lifetime(TEST_LIFETIME_MINUTES)
    }

    pub fn with_lifetime(minutes: i64) -> Result<Self, anyhow::Error> {
        Self::with_prepared_secret_file(minutes, |_| Ok(()))
    }

    /// Harness whose secret file is prepared by `prepare` before the first
    /// service instance opens it.
    pub fn with_prepared_secret_file(
        minutes: i64,
        prepare: impl FnOnce(&PathBuf) -> Result<(), anyhow::Error>,
    ) -> Result<Self, anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let secret_file = dir.path().join("app_jwt_token.json");
        prepare(&secret_file)?;

        let config = Config::from_vars(&HashMap::from([
            ("LOFT_JWT_ISSUER".to_string(), TEST_ISSUER.to_string()),
            ("LOFT_JWT_AUDIENCE".to_string(), TEST_AUDIENCE.to_string()),
            ("LOFT_JWT_EXPIRATION_MINUTES".to_string(), minutes.to_string()),
            (
                "LOFT_SECRET_FILE".to_string(),
                secret_file.display().to_string(),
            ),
        ]))?;

        let clock = Arc::new(ManualClock::new(test_start()));
        let service = AuthService::with_clock(&config, Arc::clone(&clock) as Arc<dyn Clock>)?;

        Ok(Self {
            dir,
            clock,
            config,
            service,
        })
    }

    pub fn service(&self) -> &AuthService {
        &self.service
    }

    pub fn clock(&self) -> &Arc<ManualClock> {
        &self.clock
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn secret_path(&self) -> PathBuf {
        self.config.secret_file.clone()
    }

    pub fn dir(&self) -> &TempDir {
        &self.dir
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Drop the current service and open a new one on the same secret file
    /// and clock, as a process restart would.
    pub fn restart(&mut self) -> Result<(), anyhow::Error> {
        self.service =
            AuthService::with_clock(&self.config, Arc::clone(&self.clock) as Arc<dyn Clock>)?;
        Ok(())
    }

    /// An independent service instance on the same file and clock.
    pub fn open_another(&self) -> Result<AuthService, anyhow::Error> {
        Ok(AuthService::with_clock(
            &self.config,
            Arc::clone(&self.clock) as Arc<dyn Clock>,
        )?)
    }
}
