use crate::crypto;
use crate::errors::TokenError;
use crate::models::{Claims, Role};
use crate::observability::metrics;
use crate::services::claims::{check_expiry, check_issuer_and_audience};
use crate::services::secret_store::{SecretStore, ValidationParameters};
use chrono::{DateTime, Utc};
use common::jwt::{extract_bearer_token, extract_kid, JwtValidationError};
use std::sync::Arc;
use tracing::instrument;

/// Validates presented tokens against the secrets the store currently accepts.
#[derive(Clone)]
pub struct TokenValidator {
    store: Arc<SecretStore>,
}

impl TokenValidator {
    pub fn new(store: Arc<SecretStore>) -> Self {
        Self { store }
    }

    /// Validate a raw token.
    ///
    /// Checks run in a fixed order: structure, signature, expiry, then issuer
    /// and audience. The first failure decides the error.
    #[instrument(skip_all)]
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let params = self.store.current_parameters();
        let result = validate_with(token, &params, self.store.now());

        match &result {
            Ok(_) => metrics::record_token_validation("success", None),
            Err(e) => {
                tracing::debug!(target: "loft_auth.token", category = e.category(), "Token rejected");
                metrics::record_token_validation("error", Some(e.category()));
            }
        }

        result
    }

    /// Validate the token carried in an `Authorization: Bearer` header value.
    pub fn validate_authorization_header(&self, header: &str) -> Result<Claims, TokenError> {
        let token = match extract_bearer_token(header) {
            Ok(token) => token,
            Err(e) => {
                let err = TokenError::from(e);
                metrics::record_token_validation("error", Some(err.category()));
                return Err(err);
            }
        };
        self.validate(token)
    }

    /// Subject of a validated token.
    pub fn extract_subject(&self, header: &str) -> Result<String, TokenError> {
        self.validate_authorization_header(header)
            .map(|claims| claims.subject)
    }

    /// Role of a validated token, `Role::User` when it carries none.
    pub fn extract_role(&self, header: &str) -> Result<Role, TokenError> {
        self.validate_authorization_header(header)
            .map(|claims| claims.role_or_default())
    }
}

/// Validate `token` against a parameter snapshot at instant `now`.
pub fn validate_with(
    token: &str,
    params: &ValidationParameters,
    now: DateTime<Utc>,
) -> Result<Claims, TokenError> {
    let kid = match extract_kid(token) {
        Ok(kid) => Some(kid),
        Err(JwtValidationError::MissingKid) => None,
        Err(_) => return Err(TokenError::Malformed),
    };

    let mut candidates = params
        .keys
        .iter()
        .filter(|key| kid.as_deref().map_or(true, |kid| key.key_id() == kid))
        .peekable();

    if candidates.peek().is_none() {
        tracing::debug!(target: "loft_auth.token", kid = ?kid, "No accepted secret matches token kid");
        return Err(TokenError::BadSignature);
    }

    let mut verified = None;
    for key in candidates {
        match crypto::verify_token_signature(token, key.expose_value()) {
            Ok(claims) => {
                verified = Some(claims);
                break;
            }
            Err(TokenError::BadSignature) => continue,
            Err(e) => return Err(e),
        }
    }
    let claims = verified.ok_or(TokenError::BadSignature)?;

    check_expiry(&claims, now)?;
    check_issuer_and_audience(&claims, &params.issuer, &params.audience)?;

    Ok(claims.into())
}
