//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions over issued token strings.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub role: Option<String>,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

fn decode_part<T: for<'de> Deserialize<'de>>(token: &str, index: usize) -> T {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing part {}", index));
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT part {}: {}", index, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT part {} JSON: {}", index, e))
}

fn header(token: &str) -> JwtHeader {
    decode_part(token, 0)
}

fn claims(token: &str) -> JwtClaims {
    decode_part(token, 1)
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_has_role("Admin")
///     .assert_signed_by(&key_id);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a well-formed HS256 JWT with the full claim set
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that the token carries the specified role label
    fn assert_has_role(&self, role: &str) -> &Self;

    /// Assert that the token was signed by the specified key
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert that the token expires exactly at `exp` (unix seconds)
    fn assert_expires_at(&self, exp: i64) -> &Self;

    /// Assert issuer and audience claims
    fn assert_issued_for(&self, issuer: &str, audience: &str) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts
        );

        let header = header(self);
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");
        assert!(header.kid.is_some(), "Expected a kid header");

        let claims = claims(self);
        assert!(
            claims.exp > claims.iat,
            "exp ({}) must be after iat ({})",
            claims.exp,
            claims.iat
        );

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(
            claims.sub, subject,
            "Expected subject '{}', got '{}'",
            subject, claims.sub
        );
        self
    }

    fn assert_has_role(&self, role: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(
            claims.role.as_deref(),
            Some(role),
            "Expected role '{}', got {:?}",
            role,
            claims.role
        );
        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header = header(self);
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Expected key_id '{}', got {:?}",
            key_id,
            header.kid
        );
        self
    }

    fn assert_expires_at(&self, exp: i64) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.exp, exp, "Expected exp {}, got {}", exp, claims.exp);
        self
    }

    fn assert_issued_for(&self, issuer: &str, audience: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.iss, issuer, "Unexpected issuer");
        assert_eq!(claims.aud, audience, "Unexpected audience");
        self
    }
}
