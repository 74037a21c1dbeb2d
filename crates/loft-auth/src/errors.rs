use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned to callers for every token rejection.
pub const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

#[derive(Debug, Error)]
pub enum AuthError {
    /// The OS random source failed. Tokens cannot be issued without it.
    #[error("Entropy source failure: {0}")]
    EntropySource(String),

    /// Writing the signing secret to disk failed. Recovered inside the
    /// secret store; the process keeps using the in-memory secret.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),
}

/// Why a presented token was rejected.
///
/// All variants display the same generic message. The distinction exists for
/// logs and metrics only and is never shown to end users.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("The access token is invalid or expired")]
    Malformed,

    #[error("The access token is invalid or expired")]
    BadSignature,

    #[error("The access token is invalid or expired")]
    Expired,

    #[error("The access token is invalid or expired")]
    WrongIssuerOrAudience,
}

impl TokenError {
    /// Bounded label for logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::BadSignature => "bad_signature",
            TokenError::Expired => "expired",
            TokenError::WrongIssuerOrAudience => "wrong_issuer_or_audience",
        }
    }
}

impl From<common::jwt::JwtValidationError> for TokenError {
    fn from(_: common::jwt::JwtValidationError) -> Self {
        TokenError::Malformed
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::InvalidToken(_) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                INVALID_TOKEN_MESSAGE.to_string(),
            ),
            AuthError::EntropySource(_) | AuthError::Crypto(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CRYPTO_ERROR",
                "An internal cryptographic error occurred".to_string(),
            ),
            AuthError::Persistence(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error: ErrorDetail {
                    code: code.to_string(),
                    message,
                },
            }),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}
