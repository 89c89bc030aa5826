//! User role and session models

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::{SessionKey, SessionStore};

/// User roles known to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Enforcement officer - may issue and manage fines
    Authority,
    /// Member of the public - may check and pay fines
    Citizen,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Authority => "AUTHORITY",
            Role::Citizen => "CITIZEN",
        }
    }

    /// Interpret a role string read back from session storage.
    ///
    /// Storage is not trusted to hold a valid role, so anything other than
    /// `AUTHORITY` is treated as the least privileged role.
    pub fn from_stored(value: &str) -> Self {
        if value == Role::Authority.as_str() {
            Role::Authority
        } else {
            Role::Citizen
        }
    }

    pub fn is_authority(&self) -> bool {
        matches!(self, Role::Authority)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUTHORITY" => Ok(Role::Authority),
            "CITIZEN" => Ok(Role::Citizen),
            other => Err(Error::Validation(format!("unknown role '{}'", other))),
        }
    }
}

/// Client-side session for a logged-in user
///
/// Nothing here is verified server-side; the presence of a token is the
/// only access check the client performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            role,
        }
    }

    /// Session with a synthetic `mock-token-<millis>` token
    pub fn mock(username: impl Into<String>, role: Role) -> Self {
        let token = format!("mock-token-{}", Utc::now().timestamp_millis());
        Self::new(token, username, role)
    }

    /// Read the session back from storage; `None` when no token is stored
    pub fn load(store: &dyn SessionStore) -> Option<Self> {
        let token = store.get(SessionKey::AuthToken)?;
        let username = store.get(SessionKey::Username).unwrap_or_default();
        let role = store
            .get(SessionKey::UserRole)
            .map(|r| Role::from_stored(&r))
            .unwrap_or(Role::Citizen);
        Some(Self {
            token,
            username,
            role,
        })
    }

    /// Write all three session keys
    pub fn save(&self, store: &dyn SessionStore) -> Result<()> {
        store.set(SessionKey::AuthToken, &self.token)?;
        store.set(SessionKey::Username, &self.username)?;
        store.set(SessionKey::UserRole, self.role.as_str())?;
        Ok(())
    }

    /// Remove all three session keys
    pub fn clear(store: &dyn SessionStore) -> Result<()> {
        store.remove(SessionKey::AuthToken)?;
        store.remove(SessionKey::Username)?;
        store.remove(SessionKey::UserRole)?;
        Ok(())
    }

    pub fn is_authority(&self) -> bool {
        self.role.is_authority()
    }
}
