//! # Loft Auth Test Utilities
//!
//! Shared test utilities for the `loft-auth` crate.
//!
//! This crate provides:
//! - Deterministic secret fixtures (fixed key bytes for reproducible tests)
//! - Test token builder (hand-crafted tokens with arbitrary claims/headers)
//! - Secret file helpers (write fresh, stale or corrupt files)
//! - Auth harness (`TestAuthHarness` with a manual clock and restart support)
//! - Fixed test identities and settings
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use loft_auth_test_utils::*;
//!
//! #[test]
//! fn test_example() -> anyhow::Result<()> {
//!     let harness = TestAuthHarness::new()?;
//!     let token = harness.service().issue_token(&alice_admin())?;
//!
//!     token
//!         .assert_valid_jwt()
//!         .assert_for_subject(TEST_USER_ALICE)
//!         .assert_has_role("Admin");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod harness;
pub mod secret_files;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use harness::*;
pub use secret_files::*;
pub use test_ids::*;
pub use token_builders::*;
