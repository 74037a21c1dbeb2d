//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use these types
//! for the HMAC signing secret, bearer tokens handed to callers, and anything
//! else that must never appear in a log line.
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so a
//! struct that derives `Debug` while holding one stays safe to log. Secrets
//! are zeroized when dropped.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretBox};
//!
//! #[derive(Debug)]
//! struct SigningMaterial {
//!     key_id: String,
//!     value: SecretBox<Vec<u8>>,
//! }
//!
//! let material = SigningMaterial {
//!     key_id: "loft-20261019T120000000Z".to_string(),
//!     value: SecretBox::new(Box::new(vec![7u8; 32])),
//! };
//!
//! // key_id is visible, the key bytes are redacted
//! println!("{:?}", material);
//!
//! // Access requires an explicit call
//! assert_eq!(material.value.expose_secret().len(), 32);
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretBox<Vec<u8>>` for raw key bytes (the signing secret).
//! Use `SecretString` for encoded secrets and issued bearer tokens.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
