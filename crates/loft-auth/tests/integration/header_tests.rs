//! Parsing of the `Authorization` header value.

use loft_auth::{Role, TokenError};
use loft_auth_test_utils::*;

#[test]
fn test_scheme_is_case_insensitive_and_whitespace_tolerant() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let token = harness.service().issue_token(&alice_admin())?;

    for header in [
        format!("Bearer {}", token),
        format!("bearer {}", token),
        format!("BEARER {}", token),
        format!("  Bearer   {}  ", token),
    ] {
        assert_eq!(
            harness.service().extract_subject(&header)?,
            TEST_USER_ALICE,
            "{:?} should be accepted",
            header
        );
        assert_eq!(harness.service().extract_role(&header)?, Role::Admin);
    }
    Ok(())
}

#[test]
fn test_bad_headers_are_malformed() -> Result<(), anyhow::Error> {
    let harness = TestAuthHarness::new()?;
    let token = harness.service().issue_token(&alice_admin())?;

    for header in [
        String::new(),
        "Bearer".to_string(),
        "Bearer    ".to_string(),
        token.clone(),
        format!("Basic {}", token),
        format!("Bearer {} extra", token),
    ] {
        assert_eq!(
            harness.service().validate_authorization_header(&header),
            Err(TokenError::Malformed),
            "{:?} should be malformed",
            header
        );
    }
    Ok(())
}
