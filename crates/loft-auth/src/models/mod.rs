use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role label carried in every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Role::User),
            "Admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// The authenticated principal a token is issued for.
///
/// Supplied by the caller after its own credential check; never mutated here.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub role: Role,
}

impl Identity {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Redacts the name, which is a user identifier.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("name", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Claims extracted from a token that passed validation.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub subject: String,
    /// `None` when the token carries no role claim.
    pub role: Option<Role>,
}

impl Claims {
    /// Role claim, or `Role::User` when the token has none.
    pub fn role_or_default(&self) -> Role {
        self.role.unwrap_or_default()
    }
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("subject", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}
