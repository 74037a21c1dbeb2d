//! Damaged or unwritable secret files must not stop the service.

use chrono::Duration;
use loft_auth::clock::{Clock, ManualClock};
use loft_auth::config::Config;
use loft_auth::{AuthService, TokenError};
use loft_auth_test_utils::*;
use std::collections::HashMap;
use std::sync::Arc;

fn config_for(secret_file: &std::path::Path) -> Result<Config, anyhow::Error> {
    Ok(Config::from_vars(&HashMap::from([
        ("LOFT_JWT_ISSUER".to_string(), TEST_ISSUER.to_string()),
        ("LOFT_JWT_AUDIENCE".to_string(), TEST_AUDIENCE.to_string()),
        (
            "LOFT_SECRET_FILE".to_string(),
            secret_file.display().to_string(),
        ),
    ]))?)
}

#[test]
fn test_corrupt_secret_file_is_regenerated() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::with_prepared_secret_file(TEST_LIFETIME_MINUTES, |path| {
        write_corrupt_secret_file(path)
    })?;

    let token = harness.service().issue_token(&alice_admin())?;
    let (current, previous) = persisted_key_ids(&harness.secret_path())?;

    token.assert_signed_by(&current);
    assert!(previous.is_none());
    Ok(())
}

#[test]
fn test_corruption_between_restarts_rotates_secret() -> Result<(), anyhow::Error> {
    let mut harness = TestAuthHarness::new()?;
    let token = harness.service().issue_token(&bob_user())?;

    write_corrupt_secret_file(&harness.secret_path())?;
    harness.restart()?;

    // The old secret is gone with the file, so its tokens are no longer
    // verifiable.
    assert!(harness.service().validate_token(&token).is_err());
    let fresh = harness.service().issue_token(&bob_user())?;
    assert!(harness.service().validate_token(&fresh).is_ok());
    Ok(())
}

#[test]
fn test_unwritable_secret_path_runs_in_memory() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let secret_file = dir.path().join("missing").join("app_jwt_token.json");
    let clock = Arc::new(ManualClock::new(test_start()));
    let service = AuthService::with_clock(
        &config_for(&secret_file)?,
        Arc::clone(&clock) as Arc<dyn Clock>,
    )?;

    let token = service.issue_token(&alice_admin())?;
    assert_eq!(service.validate_token(&token)?.subject, TEST_USER_ALICE);
    assert!(!secret_file.exists());

    // Rotation keeps working without a backing file.
    clock.advance(Duration::minutes(TEST_LIFETIME_MINUTES));
    let rotated = service.issue_token(&bob_user())?;
    assert!(service.validate_token(&rotated).is_ok());
    assert_eq!(service.validate_token(&token), Err(TokenError::Expired));
    Ok(())
}

#[test]
fn test_unknown_file_version_is_replaced() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::with_prepared_secret_file(TEST_LIFETIME_MINUTES, |path| {
        std::fs::write(
            path,
            serde_json::json!({
                "version": 99,
                "current": test_secret_record(1, TEST_KEY_ID_1, test_start(), Duration::minutes(60)),
            })
            .to_string(),
        )?;
        Ok(())
    })?;

    let (current, _) = persisted_key_ids(&harness.secret_path())?;
    assert_ne!(current, TEST_KEY_ID_1);
    Ok(())
}
