use chrono::{DateTime, Utc};
use std::fmt;

use crate::models::{
    post::PostId,
    user::{Owned, UserId, UserRef},
};

/// Identifier of a comment.
///
/// Optimistic comments carry a locally synthesized id until the server
/// confirms them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommentId {
    /// Placeholder assigned before the create call resolved.
    Local(u64),
    /// Identifier assigned by the server.
    Confirmed(String),
}

impl CommentId {
    pub fn confirmed(id: impl Into<String>) -> Self {
        CommentId::Confirmed(id.into())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, CommentId::Local(_))
    }

    /// The id the remote API knows this comment by.
    pub fn server_id(&self) -> Option<&str> {
        match self {
            CommentId::Local(_) => None,
            CommentId::Confirmed(id) => Some(id),
        }
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentId::Local(n) => write!(f, "local-{}", n),
            CommentId::Confirmed(id) => f.write_str(id),
        }
    }
}

/// A comment attached to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    /// The post this comment belongs to.
    pub post_id: PostId,
    pub content: String,
    pub creator: UserRef,
    pub created_at: DateTime<Utc>,
}

impl Owned for Comment {
    fn owner_id(&self) -> &UserId {
        &self.creator.id
    }
}
