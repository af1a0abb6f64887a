use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{
    comment::{Comment, CommentId},
    user::{Owned, UserId, UserRef},
};

/// Server-assigned identifier of a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Represents a post in a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// The unique identifier for the post.
    pub id: PostId,
    /// The author of the post.
    pub user: UserRef,
    /// The text of the post.
    pub body: String,
    /// The attached image URL, if any.
    pub image: Option<String>,
    /// The timestamp when the post was created.
    pub created_at: DateTime<Utc>,
    /// Comments in stored order.
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn comment(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.id == id)
    }

    pub fn comment_mut(&mut self, id: &CommentId) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| &c.id == id)
    }

    /// Comments in display order: sorted by `created_at`, newest first.
    ///
    /// The order comes from the timestamps, not from the stored order, so a
    /// comment the server stored late but dated early sorts by its date.
    /// Only ties on the timestamp (including comments without a server
    /// date, which default to the epoch) fall back to reverse stored order.
    pub fn comments_newest_first(&self) -> Vec<&Comment> {
        let mut comments: Vec<&Comment> = self.comments.iter().rev().collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments
    }
}

impl Owned for Post {
    fn owner_id(&self) -> &UserId {
        &self.user.id
    }
}
