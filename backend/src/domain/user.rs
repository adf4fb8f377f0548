//! User accounts stored inside the document.
//!
//! Users are never created through the HTTP surface; the seeded document
//! carries the initial administrator and further accounts are added by editing
//! the data file. The types here therefore focus on lookup, login bookkeeping
//! and the digest-free projections returned to clients.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PasswordDigest;

/// Validation errors returned when constructing user primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was empty or only whitespace.
    #[error("user id must not be empty")]
    EmptyId,
    /// The username was empty or only whitespace.
    #[error("username must not be empty")]
    EmptyUsername,
}

/// Stable user identifier.
///
/// Identifiers are free-form strings (the seeded administrator uses `admin`)
/// but never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use recordkeeper::domain::UserId;
    ///
    /// let id = UserId::new("admin").expect("valid id");
    /// assert_eq!(id.as_ref(), "admin");
    /// assert!(UserId::new("  ").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role gating administrative operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May list users and clear whole collections.
    Admin,
    /// Regular record keeper.
    User,
}

impl Role {
    /// Interpret a stored role name. Anything other than `admin` is a
    /// regular user.
    #[must_use]
    pub fn from_stored(name: &str) -> Self {
        if name == Self::Admin.as_str() {
            Self::Admin
        } else {
            Self::User
        }
    }

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored user account.
///
/// The digest is serialised under the `password` key so existing data files
/// keep loading; it never holds the raw password. Hand-edited entries may
/// omit `createdAt`, carry role names beyond `admin` and `user`, or add keys
/// of their own; all of it is written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    username: String,
    #[serde(rename = "password")]
    password_digest: PasswordDigest,
    #[serde(rename = "role")]
    role_name: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    last_login: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl User {
    /// Construct a user that has never logged in.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        password_digest: PasswordDigest,
        role: Role,
        created_at: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        Ok(Self {
            id,
            username,
            password_digest,
            role_name: role.as_str().to_owned(),
            created_at: created_at.into(),
            last_login: None,
            extra: Map::new(),
        })
    }

    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login name, matched case-sensitively.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Digest compared against submitted passwords.
    #[must_use]
    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password_digest
    }

    /// Role gating administrative operations.
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_stored(&self.role_name)
    }

    /// Creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> &str {
        self.created_at.as_str()
    }

    /// Timestamp of the most recent successful login.
    #[must_use]
    pub fn last_login(&self) -> Option<&str> {
        self.last_login.as_deref()
    }

    /// Record a successful login.
    pub fn record_login(&mut self, at: impl Into<String>) {
        self.last_login = Some(at.into());
    }

    /// Projection without the password digest.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            role: self.role(),
            created_at: self.created_at.clone(),
            last_login: self.last_login.clone(),
        }
    }
}

/// User as exposed to administrators: every field except the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Stable identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Role gating administrative operations.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: String,
    /// Most recent successful login, if any.
    pub last_login: Option<String>,
}
