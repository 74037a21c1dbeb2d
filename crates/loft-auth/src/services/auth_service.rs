//! Entry point used by the rest of the backend.
//!
//! Wires one [`SecretStore`] to an issuer and a validator that share it, so
//! rotations made while issuing are immediately visible to validation.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::errors::{AuthError, TokenError};
use crate::models::{Claims, Identity, Role};
use crate::services::secret_store::SecretStore;
use crate::services::token_issuer::TokenIssuer;
use crate::services::token_validator::TokenValidator;
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<SecretStore>,
    issuer: TokenIssuer,
    validator: TokenValidator,
}

impl AuthService {
    /// Open the secret store named by `config` using the system clock.
    pub fn initialize(config: &Config) -> Result<Self, AuthError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    #[instrument(skip_all)]
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        let store = Arc::new(SecretStore::open(
            config.secret_file.clone(),
            config.token_settings(),
            clock,
        )?);

        tracing::info!(
            target: "loft_auth.store",
            issuer = %config.issuer,
            audience = %config.audience,
            token_lifetime_minutes = config.token_lifetime_minutes,
            "Auth service initialized"
        );

        Ok(Self::from_store(store))
    }

    pub fn from_store(store: Arc<SecretStore>) -> Self {
        Self {
            issuer: TokenIssuer::new(Arc::clone(&store)),
            validator: TokenValidator::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn issue_token(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issuer.issue(identity)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validator.validate(token)
    }

    pub fn validate_authorization_header(&self, header: &str) -> Result<Claims, TokenError> {
        self.validator.validate_authorization_header(header)
    }

    pub fn extract_subject(&self, header: &str) -> Result<String, TokenError> {
        self.validator.extract_subject(header)
    }

    pub fn extract_role(&self, header: &str) -> Result<Role, TokenError> {
        self.validator.extract_role(header)
    }

    pub fn secret_store(&self) -> &Arc<SecretStore> {
        &self.store
    }
}
