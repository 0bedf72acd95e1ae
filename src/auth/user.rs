//! # User Model
//!
//! The stored user record and the public views handed back to callers.
//! The password digest lives only on [`User`] and is never serialized.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role string that is neither `user` nor `admin`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// User record as persisted in the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,

    pub name: String,

    /// Unique across all users, compared byte-for-byte
    pub email: String,

    /// Argon2id digest (never plaintext)
    #[serde(skip_serializing)]
    pub password_digest: String,

    pub role: UserRole,

    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh record around an already computed digest
    pub fn new(name: String, email: String, password_digest: String, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_digest,
            role,
            created_at: Utc::now(),
        }
    }
}

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: UserRole::default(),
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }
}

/// Login input
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Public view returned by registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Public view returned by login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new(
            "Ana".to_string(),
            "a@x.com".to_string(),
            "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
            UserRole::User,
        )
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!(UserRole::default(), UserRole::User);
        assert_eq!(
            "Admin".parse::<UserRole>(),
            Err(UnknownRole("Admin".to_string()))
        );
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_new_user_defaults_to_user_role() {
        let input: NewUser =
            serde_json::from_str(r#"{"name":"Ana","email":"a@x.com","password":"pw123456"}"#)
                .unwrap();
        assert_eq!(input.role, UserRole::User);
    }

    #[test]
    fn test_user_serialization_omits_digest() {
        let user = sample();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains(&user.password_digest));
    }

    #[test]
    fn test_public_views() {
        let user = sample();
        let id = user.id;

        let registered = RegisteredUser::from(user.clone());
        let json = serde_json::to_value(&registered).unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["role"], "user");
        assert!(json.get("created_at").is_some());
        assert!(json.get("password").is_none());

        let authenticated = AuthenticatedUser::from(user);
        let json = serde_json::to_value(&authenticated).unwrap();
        assert!(json.get("created_at").is_none());
        assert!(json.get("password_digest").is_none());
    }
}
