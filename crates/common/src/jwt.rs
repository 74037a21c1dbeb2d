//! JWT utilities shared across Loft components.
//!
//! This module provides the structural checks that run before any
//! cryptographic work:
//! - Size limits for DoS prevention
//! - `Authorization: Bearer <token>` header parsing
//! - Key ID extraction from JWT headers
//! - Transport encoding of HMAC signing secrets
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Error messages are generic; details go to debug logs only
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{extract_bearer_token, extract_kid};
//!
//! let token = extract_bearer_token(header_value)?;
//! let kid = extract_kid(token)?;
//! ```

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Typical Loft tokens are around 300 bytes (HS256 signature, five claims).
/// Anything larger than this is rejected before base64 decoding or MAC
/// computation.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Authentication scheme expected in the `Authorization` header.
pub const BEARER_SCHEME: &str = "Bearer";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while inspecting a JWT before verification.
///
/// Every variant renders the same message so nothing about the rejection
/// reason leaks to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token is missing the `kid` header.
    #[error("The access token is invalid or expired")]
    MissingKid,

    /// Header value does not use the `Bearer` scheme or carries no token.
    #[error("The access token is invalid or expired")]
    MissingBearerScheme,
}

// =============================================================================
// Functions
// =============================================================================

/// Extract the token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` with a case-insensitive scheme and any amount of
/// surrounding whitespace.
///
/// # Errors
///
/// Returns `JwtValidationError::MissingBearerScheme` if the scheme is not
/// `Bearer` or the token part is empty.
pub fn extract_bearer_token(header_value: &str) -> Result<&str, JwtValidationError> {
    let trimmed = header_value.trim();
    let (scheme, rest) = trimmed
        .split_once(char::is_whitespace)
        .ok_or(JwtValidationError::MissingBearerScheme)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        tracing::debug!(target: "common.jwt", "Authorization header rejected: unsupported scheme");
        return Err(JwtValidationError::MissingBearerScheme);
    }

    let token = rest.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        tracing::debug!(target: "common.jwt", "Authorization header rejected: bad token part");
        return Err(JwtValidationError::MissingBearerScheme);
    }

    Ok(token)
}

/// Extract the `kid` (key ID) from a JWT header without verifying the signature.
///
/// Used to pick the signing secret across a rotation. The token MUST still
/// be verified after the key is selected.
///
/// # Errors
///
/// - `TokenTooLarge` - Token exceeds `MAX_JWT_SIZE_BYTES`
/// - `MalformedToken` - Wrong structure, bad base64, or invalid header JSON
/// - `MissingKid` - Header has no `kid`, or `kid` is not a non-empty string
pub fn extract_kid(token: &str) -> Result<String, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JwtValidationError::MalformedToken);
    }

    let header_part = parts.first().ok_or(JwtValidationError::MalformedToken)?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtValidationError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtValidationError::MalformedToken
    })?;

    let kid = header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtValidationError::MissingKid)?;

    Ok(kid)
}

/// Encode raw HMAC secret bytes for storage (standard base64, padded).
#[must_use]
pub fn encode_hmac_secret(secret: &[u8]) -> String {
    STANDARD.encode(secret)
}

/// Decode an HMAC secret previously produced by [`encode_hmac_secret`].
///
/// # Errors
///
/// Returns `base64::DecodeError` if the content is not valid base64.
pub fn decode_hmac_secret(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded.trim())
}

// =============================================================================
// Tests
// =============================================================================
