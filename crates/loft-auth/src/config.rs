use chrono::Duration;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default token (and signing secret) lifetime in minutes.
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 60;

/// Upper bound on the configured lifetime (7 days).
pub const MAX_TOKEN_LIFETIME_MINUTES: i64 = 10_080;

/// Default location of the persisted signing secret.
pub const DEFAULT_SECRET_FILE: &str = "app_jwt_token.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub issuer: String,
    pub audience: String,
    /// Lifetime of issued tokens; also the validity window of each signing secret.
    pub token_lifetime_minutes: i64,
    pub secret_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid token lifetime: {0}")]
    InvalidTokenLifetime(String),

    #[error("Invalid value for {0}: must not be empty")]
    EmptyValue(String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let issuer = required_non_empty(vars, "LOFT_JWT_ISSUER")?;
        let audience = required_non_empty(vars, "LOFT_JWT_AUDIENCE")?;

        let token_lifetime_minutes = match vars.get("LOFT_JWT_EXPIRATION_MINUTES") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| {
                ConfigError::InvalidTokenLifetime(format!("'{}' is not an integer: {}", raw, e))
            })?,
            None => DEFAULT_TOKEN_LIFETIME_MINUTES,
        };

        if !(1..=MAX_TOKEN_LIFETIME_MINUTES).contains(&token_lifetime_minutes) {
            return Err(ConfigError::InvalidTokenLifetime(format!(
                "Expected 1-{} minutes, got {}",
                MAX_TOKEN_LIFETIME_MINUTES, token_lifetime_minutes
            )));
        }

        let secret_file = vars
            .get("LOFT_SECRET_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRET_FILE));

        Ok(Config {
            issuer,
            audience,
            token_lifetime_minutes,
            secret_file,
        })
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::minutes(self.token_lifetime_minutes)
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            lifetime: self.token_lifetime(),
        }
    }
}

/// The subset of configuration the issuer and validator work from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    pub issuer: String,
    pub audience: String,
    /// Token lifetime; each signing secret is valid for the same span.
    pub lifetime: Duration,
}

fn required_non_empty(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    let value = vars
        .get(name)
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?
        .trim()
        .to_string();

    if value.is_empty() {
        return Err(ConfigError::EmptyValue(name.to_string()));
    }

    Ok(value)
}
