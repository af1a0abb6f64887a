use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The author of a post or the creator of a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    /// The user's identifier.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The user's photo URL, if one is set.
    pub photo: Option<String>,
}

/// The full profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// The unique identifier for the user.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The user's photo URL, if one is set.
    pub photo: Option<String>,
    /// The user's gender as reported by the API.
    pub gender: Option<String>,
    /// The user's date of birth as reported by the API.
    pub date_of_birth: Option<String>,
    /// The timestamp when the account was created.
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// The reference used to label content authored by this user.
    pub fn as_user_ref(&self) -> UserRef {
        UserRef {
            id: self.id.clone(),
            name: self.name.clone(),
            photo: self.photo.clone(),
        }
    }
}

/// Anything whose edit/delete affordances depend on who created it.
pub trait Owned {
    fn owner_id(&self) -> &UserId;
}
