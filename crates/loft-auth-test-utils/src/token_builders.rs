//! Builder for hand-crafted test tokens
//!
//! Produces tokens the issuer would never emit (wrong issuer, missing role,
//! unknown kid, other algorithms) so validation paths can be exercised
//! directly.

use crate::test_ids::{TEST_AUDIENCE, TEST_ISSUER, TEST_LIFETIME_MINUTES};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Builder for signed test tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new(test_start())
///     .for_user("alice")
///     .with_role("Admin")
///     .with_kid("loft-test-key-01")
///     .sign(&test_signing_secret(1));
/// ```
pub struct TestTokenBuilder {
    sub: String,
    role: Option<String>,
    iss: String,
    aud: String,
    exp: i64,
    iat: i64,
    kid: Option<String>,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// Create a builder for a token issued at `now` with default settings.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            sub: "test-subject".to_string(),
            role: Some("User".to_string()),
            iss: TEST_ISSUER.to_string(),
            aud: TEST_AUDIENCE.to_string(),
            exp: (now + Duration::minutes(TEST_LIFETIME_MINUTES)).timestamp(),
            iat: now.timestamp(),
            kid: None,
            algorithm: Algorithm::HS256,
        }
    }

    pub fn for_user(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Set the role label. Any string is accepted, including unknown roles.
    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    /// Omit the role claim entirely.
    pub fn without_role(mut self) -> Self {
        self.role = None;
        self
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.iss = issuer.to_string();
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.aud = audience.to_string();
        self
    }

    /// Set the expiry as an absolute instant.
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.exp = at.timestamp();
        self
    }

    pub fn with_kid(mut self, kid: &str) -> Self {
        self.kid = Some(kid.to_string());
        self
    }

    /// Sign with another HMAC algorithm (HS384/HS512).
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the claims as a JSON value
    pub fn build_claims(&self) -> Value {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!(self.sub));
        if let Some(role) = &self.role {
            claims.insert("role".to_string(), json!(role));
        }
        claims.insert("iss".to_string(), json!(self.iss));
        claims.insert("aud".to_string(), json!(self.aud));
        claims.insert("exp".to_string(), json!(self.exp));
        claims.insert("iat".to_string(), json!(self.iat));
        Value::Object(claims)
    }

    /// Sign the token with a raw HMAC secret.
    pub fn sign(self, secret: &[u8]) -> String {
        let mut header = Header::new(self.algorithm);
        header.kid = self.kid.clone();
        encode(&header, &self.build_claims(), &EncodingKey::from_secret(secret))
            .expect("test token signing should not fail")
    }
}
