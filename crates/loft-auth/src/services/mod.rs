pub mod auth_service;
pub mod claims;
pub mod secret_store;
pub mod token_issuer;
pub mod token_validator;
