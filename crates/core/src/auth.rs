//! Demo user directory
//!
//! Login is checked against a fixed table of three users sharing one
//! password. This is demo scaffolding; it is only consulted when
//! `mock_login` is enabled in the configuration.

use crate::error::{Error, Result};
use crate::models::{Role, Session};

/// Password shared by every demo user
pub const MOCK_PASSWORD: &str = "password123";

/// An entry in the demo user table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockUser {
    pub username: &'static str,
    pub role: Role,
}

const MOCK_USERS: &[MockUser] = &[
    MockUser {
        username: "testauthority",
        role: Role::Authority,
    },
    MockUser {
        username: "testcitizen",
        role: Role::Citizen,
    },
    MockUser {
        username: "vedantss",
        role: Role::Authority,
    },
];

/// Lookup over the demo user table
pub struct MockDirectory;

impl MockDirectory {
    /// Find a user by name, ignoring case
    pub fn find(username: &str) -> Option<&'static MockUser> {
        let wanted = username.to_lowercase();
        MOCK_USERS.iter().find(|u| u.username == wanted)
    }

    /// Check credentials and mint a session.
    ///
    /// The session keeps the username exactly as typed.
    pub fn authenticate(username: &str, password: &str) -> Result<Session> {
        match Self::find(username) {
            Some(user) if password == MOCK_PASSWORD => Ok(Session::mock(username, user.role)),
            _ => Err(Error::Authentication("Invalid credentials".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_users_authenticate_with_their_role() {
        for user in MOCK_USERS {
            let session = MockDirectory::authenticate(user.username, MOCK_PASSWORD).unwrap();
            assert_eq!(session.role, user.role);
            assert_eq!(session.username, user.username);
        }
    }

    #[test]
    fn test_lookup_ignores_case_but_keeps_typed_name() {
        let session = MockDirectory::authenticate("TestAuthority", MOCK_PASSWORD).unwrap();
        assert_eq!(session.role, Role::Authority);
        assert_eq!(session.username, "TestAuthority");
    }

    #[test]
    fn test_rejects_unknown_user_and_wrong_password() {
        assert!(MockDirectory::authenticate("nobody", MOCK_PASSWORD).is_err());
        assert!(MockDirectory::authenticate("testcitizen", "password124").is_err());
        assert!(MockDirectory::authenticate("testcitizen", "").is_err());
        assert!(MockDirectory::authenticate("", MOCK_PASSWORD).is_err());
    }
}
