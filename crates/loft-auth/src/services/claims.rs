//! Mapping between identities, wire claims and validated claims.

use crate::config::TokenSettings;
use crate::crypto::TokenClaims;
use crate::errors::TokenError;
use crate::models::{Claims, Identity};
use chrono::{DateTime, Utc};

/// Wire claims for a token issued to `identity` at `now`.
pub fn claims_for_identity(
    identity: &Identity,
    settings: &TokenSettings,
    now: DateTime<Utc>,
) -> TokenClaims {
    TokenClaims {
        sub: identity.name.clone(),
        role: Some(identity.role),
        iss: settings.issuer.clone(),
        aud: settings.audience.clone(),
        exp: (now + settings.lifetime).timestamp(),
        iat: now.timestamp(),
    }
}

/// A token is usable strictly before its `exp` second. No leeway.
pub fn check_expiry(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if now.timestamp() < claims.exp {
        Ok(())
    } else {
        Err(TokenError::Expired)
    }
}

pub fn check_issuer_and_audience(
    claims: &TokenClaims,
    issuer: &str,
    audience: &str,
) -> Result<(), TokenError> {
    if claims.iss == issuer && claims.aud == audience {
        Ok(())
    } else {
        Err(TokenError::WrongIssuerOrAudience)
    }
}

impl From<TokenClaims> for Claims {
    fn from(claims: TokenClaims) -> Self {
        Claims {
            subject: claims.sub,
            role: claims.role,
        }
    }
}
