//! Rotation of the signing secret across its validity window and restarts.

use chrono::Duration;
use loft_auth::TokenError;
use loft_auth_test_utils::*;
use std::sync::Arc;

fn kid_of(token: &str) -> String {
    jsonwebtoken::decode_header(token)
        .expect("issued token has a header")
        .kid
        .expect("issued token has a kid")
}

#[test]
fn test_secret_is_stable_within_window() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let store = harness.service().secret_store();

    let first = store.ensure_fresh()?;
    for _ in 0..5 {
        harness.advance(Duration::minutes(11));
        assert!(Arc::ptr_eq(&first, &store.ensure_fresh()?));
    }
    Ok(())
}

#[test]
fn test_issue_after_window_rotates_once() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;

    let before = harness.service().issue_token(&bob_user())?;
    harness.advance(Duration::minutes(TEST_LIFETIME_MINUTES));
    let after_1 = harness.service().issue_token(&bob_user())?;
    let after_2 = harness.service().issue_token(&bob_user())?;

    assert_ne!(kid_of(&before), kid_of(&after_1));
    assert_eq!(kid_of(&after_1), kid_of(&after_2));

    let (current, previous) = persisted_key_ids(&harness.secret_path())?;
    assert_eq!(current, kid_of(&after_1));
    assert_eq!(previous, Some(kid_of(&before)));
    Ok(())
}

#[test]
fn test_token_signed_before_rotation_validates_after_it() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;

    harness.advance(Duration::minutes(TEST_LIFETIME_MINUTES - 1));
    let late_token = harness.service().issue_token(&alice_admin())?;

    harness.advance(Duration::minutes(1));
    let fresh_token = harness.service().issue_token(&bob_user())?;
    assert_ne!(kid_of(&late_token), kid_of(&fresh_token));

    let claims = harness.service().validate_token(&late_token)?;
    assert_eq!(claims.subject, TEST_USER_ALICE);

    // The old secret stops mattering once its last token has expired.
    harness.advance(Duration::minutes(TEST_LIFETIME_MINUTES - 1));
    assert_eq!(
        harness.service().validate_token(&late_token),
        Err(TokenError::Expired)
    );
    Ok(())
}

#[test]
fn test_restart_reuses_fresh_secret() -> Result<(), anyhow::Error> {
    let mut harness = TestAuthHarness::new()?;
    let token = harness.service().issue_token(&alice_admin())?;

    harness.advance(Duration::minutes(30));
    harness.restart()?;

    assert_eq!(
        harness.service().secret_store().ensure_fresh()?.key_id(),
        kid_of(&token)
    );
    assert_eq!(
        harness.service().validate_token(&token)?.subject,
        TEST_USER_ALICE
    );
    Ok(())
}

#[test]
fn test_restart_after_window_rotates_but_keeps_old_tokens_valid() -> Result<(), anyhow::Error> {
    let mut harness = TestAuthHarness::new()?;

    harness.advance(Duration::minutes(TEST_LIFETIME_MINUTES - 5));
    let token = harness.service().issue_token(&alice_admin())?;

    harness.advance(Duration::minutes(10));
    harness.restart()?;

    let current = harness.service().secret_store().ensure_fresh()?;
    assert_ne!(current.key_id(), kid_of(&token));
    assert!(harness.service().validate_token(&token).is_ok());
    Ok(())
}

#[test]
fn test_stale_secret_file_from_previous_run_is_rotated() -> Result<(), anyhow::Error> {
    let lifetime = Duration::minutes(TEST_LIFETIME_MINUTES);
    let harness = TestAuthHarness::with_prepared_secret_file(TEST_LIFETIME_MINUTES, |path| {
        write_secret_file(path, 1, TEST_KEY_ID_1, test_start() - lifetime - Duration::minutes(1), lifetime)
    })?;

    let (current, previous) = persisted_key_ids(&harness.secret_path())?;
    assert_ne!(current, TEST_KEY_ID_1);
    assert_eq!(previous.as_deref(), Some(TEST_KEY_ID_1));

    // A token the previous run signed a minute before its secret went stale
    // is still accepted.
    let old_token = TestTokenBuilder::new(test_start() - Duration::minutes(2))
        .for_user(TEST_USER_BOB)
        .with_kid(TEST_KEY_ID_1)
        .sign(&test_signing_secret(1));
    assert_eq!(
        harness.service().validate_token(&old_token)?.subject,
        TEST_USER_BOB
    );
    Ok(())
}

#[test]
fn test_fresh_secret_file_from_previous_run_is_reused() -> Result<(), anyhow::Error> {
    let lifetime = Duration::minutes(TEST_LIFETIME_MINUTES);
    let harness = TestAuthHarness::with_prepared_secret_file(TEST_LIFETIME_MINUTES, |path| {
        write_secret_file(path, 2, TEST_KEY_ID_2, test_start() - Duration::minutes(10), lifetime)
    })?;

    let token = harness.service().issue_token(&bob_user())?;
    token.assert_signed_by(TEST_KEY_ID_2);

    let verified = loft_auth::crypto::verify_token_signature(&token, &test_signing_secret(2))?;
    assert_eq!(verified.sub, TEST_USER_BOB);
    Ok(())
}

#[test]
fn test_two_instances_on_one_file_accept_each_others_tokens() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let other = harness.open_another()?;

    let token = harness.service().issue_token(&alice_admin())?;
    assert_eq!(other.validate_token(&token)?.subject, TEST_USER_ALICE);
    Ok(())
}
