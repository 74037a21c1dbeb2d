use crate::errors::{AuthError, TokenError};
use crate::services::auth_service::AuthService;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

/// Authentication middleware for bearer tokens.
///
/// Validates the `Authorization` header, stores the resulting [`Claims`] in
/// request extensions for downstream handlers, and rejects the request with
/// a single 401 response for every kind of token failure.
///
/// [`Claims`]: crate::models::Claims
pub async fn require_auth(
    State(service): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::InvalidToken(TokenError::Malformed))?;

    let claims = service.validate_authorization_header(header)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
