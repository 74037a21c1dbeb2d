//! Common utilities and types shared across Loft components.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (size limits, bearer parsing, key ID extraction)
pub mod jwt;
