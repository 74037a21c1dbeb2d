use crate::errors::{AuthError, TokenError};
use crate::models::Role;
use common::jwt::MAX_JWT_SIZE_BYTES;
use common::secret::SecretBox;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::instrument;

/// Length of a signing secret in bytes (256 bits).
pub const SECRET_LENGTH_BYTES: usize = 32;

/// Only HS256 is issued or accepted.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims as they appear on the wire.
///
/// The `sub` field holds a user name and is redacted in Debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("sub", &"[REDACTED]")
            .field("role", &self.role)
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .finish()
    }
}

/// Source of key material.
///
/// Implemented for ring's `SystemRandom`; tests substitute sources that fail.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<(), ring::error::Unspecified>;
}

impl EntropySource for SystemRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), ring::error::Unspecified> {
        SecureRandom::fill(self, dest)
    }
}

/// Generate a fresh 256-bit signing secret.
///
/// Failure means the entropy source is unusable; callers must not fall back
/// to anything weaker.
#[instrument(skip_all)]
pub fn generate_signing_secret(rng: &dyn EntropySource) -> Result<SecretBox<Vec<u8>>, AuthError> {
    let mut bytes = vec![0u8; SECRET_LENGTH_BYTES];
    rng.fill(&mut bytes).map_err(|e| {
        tracing::error!(target: "loft_auth.crypto", "Random source failed while generating signing secret");
        AuthError::EntropySource(format!("Signing secret generation failed: {}", e))
    })?;
    Ok(SecretBox::new(Box::new(bytes)))
}

/// Sign claims with an HMAC secret (HS256), tagging the header with `key_id`.
#[instrument(skip_all)]
pub fn sign_token(claims: &TokenClaims, secret: &[u8], key_id: &str) -> Result<String, AuthError> {
    if secret.len() != SECRET_LENGTH_BYTES {
        return Err(AuthError::Crypto(format!(
            "Invalid signing secret length: {} (expected {})",
            secret.len(),
            SECRET_LENGTH_BYTES
        )));
    }

    let mut header = Header::new(TOKEN_ALGORITHM);
    header.typ = Some("JWT".to_string());
    header.kid = Some(key_id.to_string());

    encode(&header, claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify the token's HMAC against one secret and decode its claims.
///
/// Only structure and signature are checked here. Expiry, issuer and
/// audience are checked by the validator against its own clock and settings.
#[instrument(skip_all)]
pub fn verify_token_signature(token: &str, secret: &[u8]) -> Result<TokenClaims, TokenError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "loft_auth.crypto",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(TokenError::Malformed);
    }

    let decoding_key = DecodingKey::from_secret(secret);

    decode::<TokenClaims>(token, &decoding_key, &signature_only_validation())
        .map(|data| data.claims)
        .map_err(|e| {
            let err = match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                _ => TokenError::Malformed,
            };
            tracing::debug!(target: "loft_auth.crypto", error = %e, category = err.category(), "Token verification failed");
            err
        })
}

fn signature_only_validation() -> Validation {
    let mut validation = Validation::new(TOKEN_ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation
}
