//! Chaos tests for rotation under concurrent issuance and validation
//!
//! Many threads hit the service at the instant the signing secret goes
//! stale. Exactly one rotation must happen and every token issued on either
//! side of it must stay valid.

use chrono::Duration;
use loft_auth::Identity;
use loft_auth::Role;
use loft_auth_test_utils::*;
use std::collections::HashSet;
use std::sync::Barrier;

const THREADS: usize = 16;

fn kid_of(token: &str) -> String {
    jsonwebtoken::decode_header(token)
        .expect("issued token has a header")
        .kid
        .expect("issued token has a kid")
}

#[test]
fn test_concurrent_issuers_observe_exactly_one_rotation() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let old_kid = harness.service().secret_store().ensure_fresh()?.key_id().to_string();
    harness.advance(Duration::minutes(TEST_LIFETIME_MINUTES));

    let barrier = Barrier::new(THREADS);
    let tokens: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let barrier = &barrier;
                let service = harness.service();
                scope.spawn(move || {
                    barrier.wait();
                    service
                        .issue_token(&Identity::new(format!("user-{}", i), Role::User))
                        .expect("issuance should succeed")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("issuer thread panicked"))
            .collect()
    });

    let kids: HashSet<String> = tokens.iter().map(|t| kid_of(t)).collect();
    assert_eq!(kids.len(), 1, "all tokens must share one new secret");
    assert!(!kids.contains(&old_kid));

    let (current, previous) = persisted_key_ids(&harness.secret_path())?;
    assert!(kids.contains(&current));
    assert_eq!(previous, Some(old_kid));

    for token in &tokens {
        harness.service().validate_token(token)?;
    }
    Ok(())
}

#[test]
fn test_validation_during_rotation_never_fails() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    harness.advance(Duration::minutes(TEST_LIFETIME_MINUTES - 1));
    let token = harness.service().issue_token(&alice_admin())?;
    harness.advance(Duration::minutes(1));

    let barrier = Barrier::new(THREADS);
    std::thread::scope(|scope| {
        for i in 0..THREADS {
            let barrier = &barrier;
            let service = harness.service();
            let token = &token;
            scope.spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    service
                        .issue_token(&bob_user())
                        .expect("issuance should succeed");
                } else {
                    let claims = service
                        .validate_token(token)
                        .expect("pre-rotation token must stay valid");
                    assert_eq!(claims.subject, TEST_USER_ALICE);
                }
            });
        }
    });

    assert_eq!(
        harness.service().secret_store().current_parameters().keys.len(),
        2
    );
    Ok(())
}
