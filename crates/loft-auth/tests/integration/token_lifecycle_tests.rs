//! Issue/validate round trips and expiry boundaries.

use chrono::Duration;
use loft_auth::{Identity, Role, TokenError};
use loft_auth_test_utils::*;

#[test]
fn test_issue_then_validate_returns_identity() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;

    let token = harness.service().issue_token(&alice_admin())?;
    let claims = harness.service().validate_token(&token)?;

    assert_eq!(claims.subject, TEST_USER_ALICE);
    assert_eq!(claims.role, Some(Role::Admin));
    Ok(())
}

#[test]
fn test_issued_token_shape() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let token = harness.service().issue_token(&bob_user())?;
    let current = harness.service().secret_store().ensure_fresh()?;

    token
        .assert_valid_jwt()
        .assert_for_subject(TEST_USER_BOB)
        .assert_has_role("User")
        .assert_issued_for(TEST_ISSUER, TEST_AUDIENCE)
        .assert_signed_by(current.key_id())
        .assert_expires_at(test_start().timestamp() + TEST_LIFETIME_MINUTES * 60);
    Ok(())
}

/// Lifetime 60 min, issuer "loft", audience "loft-api": valid right away,
/// expired 61 minutes later.
#[test]
fn test_alice_admin_scenario() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let token = harness
        .service()
        .issue_token(&Identity::new("alice", Role::Admin))?;
    let header = format!("Bearer {}", token);

    let claims = harness.service().validate_authorization_header(&header)?;
    assert_eq!(claims.subject, "alice");
    assert_eq!(claims.role_or_default(), Role::Admin);

    harness.advance(Duration::minutes(61));
    assert_eq!(
        harness.service().validate_authorization_header(&header),
        Err(TokenError::Expired)
    );
    Ok(())
}

#[test]
fn test_expiry_boundary_is_exact() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let token = harness.service().issue_token(&bob_user())?;
    let lifetime = Duration::minutes(TEST_LIFETIME_MINUTES);

    harness.advance(lifetime - Duration::seconds(1));
    assert!(harness.service().validate_token(&token).is_ok());

    harness.advance(Duration::seconds(2));
    assert_eq!(
        harness.service().validate_token(&token),
        Err(TokenError::Expired)
    );
    Ok(())
}

#[test]
fn test_custom_lifetime_applies_to_tokens() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::with_lifetime(5)?;
    let token = harness.service().issue_token(&bob_user())?;

    token.assert_expires_at(test_start().timestamp() + 5 * 60);

    harness.advance(Duration::minutes(5));
    assert_eq!(
        harness.service().validate_token(&token),
        Err(TokenError::Expired)
    );
    Ok(())
}

#[test]
fn test_missing_role_claim_extracts_as_user() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let current = harness.service().secret_store().ensure_fresh()?;
    let token = TestTokenBuilder::new(test_start())
        .for_user(TEST_USER_CAROL)
        .without_role()
        .with_kid(current.key_id())
        .sign(current.expose_value());

    let header = format!("Bearer {}", token);
    assert_eq!(harness.service().extract_role(&header)?, Role::User);
    assert_eq!(harness.service().extract_subject(&header)?, TEST_USER_CAROL);
    Ok(())
}

#[test]
fn test_unknown_role_label_is_malformed() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let current = harness.service().secret_store().ensure_fresh()?;
    let token = TestTokenBuilder::new(test_start())
        .with_role("Superuser")
        .with_kid(current.key_id())
        .sign(current.expose_value());

    assert_eq!(
        harness.service().validate_token(&token),
        Err(TokenError::Malformed)
    );
    Ok(())
}

#[test]
fn test_wrong_issuer_or_audience_rejected() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let current = harness.service().secret_store().ensure_fresh()?;

    for token in [
        TestTokenBuilder::new(test_start()).with_issuer("other-issuer"),
        TestTokenBuilder::new(test_start()).with_audience("other-api"),
    ]
    .map(|builder| builder.with_kid(current.key_id()).sign(current.expose_value()))
    {
        assert_eq!(
            harness.service().validate_token(&token),
            Err(TokenError::WrongIssuerOrAudience)
        );
    }
    Ok(())
}

#[test]
fn test_expired_and_wrong_issuer_reports_expired() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let current = harness.service().secret_store().ensure_fresh()?;
    let token = TestTokenBuilder::new(test_start())
        .with_issuer("other-issuer")
        .expires_at(test_start() - Duration::seconds(1))
        .with_kid(current.key_id())
        .sign(current.expose_value());

    assert_eq!(
        harness.service().validate_token(&token),
        Err(TokenError::Expired)
    );
    Ok(())
}

#[test]
fn test_every_rejection_has_the_same_message() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let token = harness.service().issue_token(&bob_user())?;
    harness.advance(Duration::minutes(61));

    let expired = harness.service().validate_token(&token).unwrap_err();
    let malformed = harness.service().validate_token("garbage").unwrap_err();

    assert_eq!(expired.to_string(), malformed.to_string());
    assert_eq!(expired.to_string(), loft_auth::errors::INVALID_TOKEN_MESSAGE);
    Ok(())
}
