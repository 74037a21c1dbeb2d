use crate::crypto;
use crate::errors::AuthError;
use crate::models::Identity;
use crate::observability::{hash_for_correlation, metrics};
use crate::services::claims::claims_for_identity;
use crate::services::secret_store::SecretStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Issues signed bearer tokens for authenticated identities.
#[derive(Clone)]
pub struct TokenIssuer {
    store: Arc<SecretStore>,
}

impl TokenIssuer {
    pub fn new(store: Arc<SecretStore>) -> Self {
        Self { store }
    }

    /// Issue a token for `identity`, rotating the signing secret first if it
    /// is stale.
    ///
    /// The token is signed with the secret returned by the freshness check,
    /// and that check and the claims share one clock reading, so `iat` always
    /// falls inside the signing secret's window.
    #[instrument(skip_all, fields(role = %identity.role))]
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        let start = Instant::now();

        let result = self.issue_inner(identity);

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::record_token_issuance(status, start.elapsed());

        match &result {
            Ok(_) => tracing::debug!(
                target: "loft_auth.token",
                subject_hash = %hash_for_correlation(&identity.name),
                role = %identity.role,
                "Issued token"
            ),
            Err(e) => tracing::error!(
                target: "loft_auth.token",
                error = %e,
                "Token issuance failed"
            ),
        }

        result
    }

    fn issue_inner(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = self.store.now();
        let secret = self.store.ensure_fresh_at(now)?;
        let claims = claims_for_identity(identity, self.store.settings(), now);
        crypto::sign_token(&claims, secret.expose_value(), secret.key_id())
    }
}
