//! Loft Auth Library
//!
//! Credential and token lifecycle for the Loft backend: owns the HMAC signing
//! secret, rotates it when its validity window elapses, issues signed bearer
//! tokens for identities, and validates tokens presented by callers.
//!
//! # Modules
//!
//! - `clock` - Injectable time source
//! - `config` - Service configuration
//! - `crypto` - Secret generation, token signing and verification
//! - `errors` - Error types
//! - `middleware` - Request-layer adapter (axum)
//! - `models` - Identities, roles, validated claims
//! - `repositories` - Durable secret file
//! - `services` - Secret store, issuer, validator, facade

pub mod clock;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;

pub use errors::{AuthError, TokenError};
pub use models::{Claims, Identity, Role};
pub use services::auth_service::AuthService;
