//! Fixed test values for deterministic tests
//!
//! Using a fixed start instant keeps key ids and expiry timestamps
//! reproducible across runs.

use chrono::{DateTime, TimeZone, Utc};
use loft_auth::{Identity, Role};

// Token settings
pub const TEST_ISSUER: &str = "loft";
pub const TEST_AUDIENCE: &str = "loft-api";
pub const TEST_LIFETIME_MINUTES: i64 = 60;

// Users
pub const TEST_USER_ALICE: &str = "alice";
pub const TEST_USER_BOB: &str = "bob";
pub const TEST_USER_CAROL: &str = "carol";

// Key ids for hand-written secret files
pub const TEST_KEY_ID_1: &str = "loft-test-key-01";
pub const TEST_KEY_ID_2: &str = "loft-test-key-02";

/// Instant every [`crate::TestAuthHarness`] clock starts at.
pub fn test_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
        .single()
        .expect("fixed test start is a valid instant")
}

pub fn alice_admin() -> Identity {
    Identity::new(TEST_USER_ALICE, Role::Admin)
}

pub fn bob_user() -> Identity {
    Identity::new(TEST_USER_BOB, Role::User)
}
