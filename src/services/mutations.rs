use chrono::Utc;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{FeedError, Result},
    models::{
        comment::{Comment, CommentId},
        feed::FeedState,
        post::{Post, PostId},
        session::Session,
        user::UserRef,
    },
    repositories::api::RemoteApi,
    validation::content::validate_comment_body,
};

pub const DELETE_COMMENT_PROMPT: &str = "Are you sure you want to delete this comment?";
pub const DELETE_POST_PROMPT: &str = "Are you sure you want to delete this post?";

pub const CREATE_COMMENT_FAILED: &str = "Failed to post comment. Please try again.";
pub const UPDATE_COMMENT_FAILED: &str = "Failed to update comment. Please try again.";
pub const DELETE_COMMENT_FAILED: &str = "Failed to delete comment. Please try again.";
pub const DELETE_POST_FAILED: &str = "Failed to delete post. Please try again.";

/// Feed state shared between a view and its engine. The lock is never held
/// across a remote call.
pub type SharedFeed = Arc<Mutex<FeedState>>;

/// What happens to an optimistic change whose remote call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackPolicy {
    /// Undo the local change.
    #[default]
    Revert,
    /// Leave the local change in place.
    Keep,
}

impl FromStr for RollbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revert" => Ok(RollbackPolicy::Revert),
            "keep" => Ok(RollbackPolicy::Keep),
            other => Err(format!("unknown rollback policy `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    CreateComment,
    EditComment,
    DeleteComment,
    DeletePost,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationKind::CreateComment => "comment-create",
            MutationKind::EditComment => "comment-edit",
            MutationKind::DeleteComment => "comment-delete",
            MutationKind::DeletePost => "post-delete",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Confirmed,
    Failed,
}

/// Result of a mutation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The remote call succeeded.
    Confirmed(MutationKind),
    /// A comment was created. Carries its id after reconciliation, which is
    /// still `Local` if the server response did not identify it.
    CommentCreated(CommentId),
    /// The user declined the confirmation prompt; nothing changed.
    Declined,
}

/// Asks the user to confirm a destructive action.
pub trait Confirmation: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirms everything. For non-interactive callers.
pub struct AlwaysConfirm;

impl Confirmation for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// How to take a local change back.
enum Undo {
    RemoveComment {
        post_id: PostId,
        comment_id: CommentId,
    },
    RestoreBody {
        post_id: PostId,
        comment_id: CommentId,
        body: String,
    },
    ReinsertComment {
        post_id: PostId,
        index: usize,
        comment: Comment,
    },
    ReinsertPost {
        index: usize,
        post: Post,
    },
}

impl Undo {
    /// Targets that disappeared in the meantime are skipped.
    fn revert(self, feed: &mut FeedState) {
        match self {
            Undo::RemoveComment {
                post_id,
                comment_id,
            } => {
                if let Some(post) = feed.page.post_mut(&post_id) {
                    post.comments.retain(|c| c.id != comment_id);
                }
            }
            Undo::RestoreBody {
                post_id,
                comment_id,
                body,
            } => {
                if let Some(comment) = feed
                    .page
                    .post_mut(&post_id)
                    .and_then(|p| p.comment_mut(&comment_id))
                {
                    comment.content = body;
                }
            }
            Undo::ReinsertComment {
                post_id,
                index,
                comment,
            } => {
                if let Some(post) = feed.page.post_mut(&post_id) {
                    if post.comment(&comment.id).is_none() {
                        let at = index.min(post.comments.len());
                        post.comments.insert(at, comment);
                    }
                }
            }
            Undo::ReinsertPost { index, post } => {
                if feed.page.post(&post.id).is_none() {
                    let at = index.min(feed.page.posts.len());
                    feed.page.posts.insert(at, post);
                }
            }
        }
    }
}

/// One optimistic change on its way to the server.
struct Mutation {
    id: Uuid,
    kind: MutationKind,
    state: MutationState,
    undo: Undo,
}

impl Mutation {
    fn pending(kind: MutationKind, undo: Undo) -> Self {
        let mutation = Self {
            id: Uuid::new_v4(),
            kind,
            state: MutationState::Pending,
            undo,
        };
        tracing::debug!(mutation = %mutation.id, "⏳ {} applied locally", kind);
        mutation
    }

    fn transition(&mut self, next: MutationState) {
        tracing::debug!(
            mutation = %self.id,
            "{} {:?} -> {:?}",
            self.kind,
            self.state,
            next
        );
        self.state = next;
    }
}

/// Applies changes to the local feed first, then confirms them remotely.
///
/// Ownership is not checked here; the API rejects what the caller may not
/// do and that rejection is surfaced like any other failure.
pub struct MutationEngine {
    api: Arc<dyn RemoteApi>,
    feed: SharedFeed,
    confirmation: Arc<dyn Confirmation>,
    policy: RollbackPolicy,
}

impl MutationEngine {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        feed: SharedFeed,
        confirmation: Arc<dyn Confirmation>,
        policy: RollbackPolicy,
    ) -> Self {
        Self {
            api,
            feed,
            confirmation,
            policy,
        }
    }

    /// Adds a comment to `post_id`.
    ///
    /// A placeholder is prepended and the comment panel opened before the
    /// create call is issued; on success the placeholder takes the server id.
    pub async fn create_comment(
        &self,
        post_id: &PostId,
        body: &str,
        session: &Session,
    ) -> Result<MutationOutcome> {
        let content = validate_comment_body(body)?.to_string();

        let (mutation, local_id) = {
            let mut feed = self.feed.lock().await;
            if feed.is_submitting(post_id) {
                return Err(FeedError::ValidationRejected(
                    "A comment is already being posted".to_string(),
                ));
            }
            if feed.page.post(post_id).is_none() {
                return Err(FeedError::NotFound(format!("Post {}", post_id)));
            }

            let creator = match &feed.viewer {
                Some(viewer) if !viewer.name.is_empty() && &viewer.id == session.subject() => {
                    viewer.as_user_ref()
                }
                _ => UserRef {
                    id: session.subject().clone(),
                    name: "You".to_string(),
                    photo: None,
                },
            };
            let local_id = CommentId::Local(feed.next_local_id());
            let placeholder = Comment {
                id: local_id.clone(),
                post_id: post_id.clone(),
                content: content.clone(),
                creator,
                created_at: Utc::now(),
            };

            if let Some(post) = feed.page.post_mut(post_id) {
                post.comments.insert(0, placeholder);
            }
            feed.expanded.insert(post_id.clone());
            feed.submitting.insert(post_id.clone());

            let undo = Undo::RemoveComment {
                post_id: post_id.clone(),
                comment_id: local_id.clone(),
            };
            (Mutation::pending(MutationKind::CreateComment, undo), local_id)
        };

        let result = self.api.create_comment(session, post_id, &content).await;
        self.feed.lock().await.submitting.remove(post_id);

        let server_comments = self.settle(mutation, result, CREATE_COMMENT_FAILED).await?;
        let id = self
            .reconcile(post_id, &local_id, &content, session, server_comments)
            .await;
        Ok(MutationOutcome::CommentCreated(id))
    }

    /// Replaces the body of a confirmed comment.
    pub async fn edit_comment(
        &self,
        comment_id: &CommentId,
        post_id: &PostId,
        new_body: &str,
        session: &Session,
    ) -> Result<MutationOutcome> {
        let content = validate_comment_body(new_body)?.to_string();
        let server_id = require_server_id(comment_id)?;

        let mutation = {
            let mut feed = self.feed.lock().await;
            let comment = feed
                .page
                .post_mut(post_id)
                .and_then(|p| p.comment_mut(comment_id))
                .ok_or_else(|| FeedError::NotFound(format!("Comment {}", comment_id)))?;
            let previous = std::mem::replace(&mut comment.content, content.clone());
            let undo = Undo::RestoreBody {
                post_id: post_id.clone(),
                comment_id: comment_id.clone(),
                body: previous,
            };
            Mutation::pending(MutationKind::EditComment, undo)
        };

        let result = self
            .api
            .update_comment(session, &server_id, &content)
            .await;
        self.settle(mutation, result, UPDATE_COMMENT_FAILED).await?;
        Ok(MutationOutcome::Confirmed(MutationKind::EditComment))
    }

    /// Deletes a confirmed comment after the user agrees.
    pub async fn delete_comment(
        &self,
        comment_id: &CommentId,
        post_id: &PostId,
        session: &Session,
    ) -> Result<MutationOutcome> {
        if !self.confirmation.confirm(DELETE_COMMENT_PROMPT) {
            tracing::debug!("Comment delete declined");
            return Ok(MutationOutcome::Declined);
        }
        let server_id = require_server_id(comment_id)?;

        let mutation = {
            let mut feed = self.feed.lock().await;
            let post = feed
                .page
                .post_mut(post_id)
                .ok_or_else(|| FeedError::NotFound(format!("Post {}", post_id)))?;
            let index = post
                .comments
                .iter()
                .position(|c| &c.id == comment_id)
                .ok_or_else(|| FeedError::NotFound(format!("Comment {}", comment_id)))?;
            let comment = post.comments.remove(index);
            let undo = Undo::ReinsertComment {
                post_id: post_id.clone(),
                index,
                comment,
            };
            Mutation::pending(MutationKind::DeleteComment, undo)
        };

        let result = self.api.delete_comment(session, &server_id).await;
        self.settle(mutation, result, DELETE_COMMENT_FAILED).await?;
        Ok(MutationOutcome::Confirmed(MutationKind::DeleteComment))
    }

    /// Deletes a post after the user agrees.
    pub async fn delete_post(&self, post_id: &PostId, session: &Session) -> Result<MutationOutcome> {
        if !self.confirmation.confirm(DELETE_POST_PROMPT) {
            tracing::debug!("Post delete declined");
            return Ok(MutationOutcome::Declined);
        }

        let mutation = {
            let mut feed = self.feed.lock().await;
            let index = feed
                .page
                .position(post_id)
                .ok_or_else(|| FeedError::NotFound(format!("Post {}", post_id)))?;
            let post = feed.page.posts.remove(index);
            feed.deleting.insert(post_id.clone());
            Mutation::pending(MutationKind::DeletePost, Undo::ReinsertPost { index, post })
        };

        let result = self.api.delete_post(session, post_id).await;
        self.feed.lock().await.deleting.remove(post_id);
        self.settle(mutation, result, DELETE_POST_FAILED).await?;
        Ok(MutationOutcome::Confirmed(MutationKind::DeletePost))
    }

    /// Moves a pending mutation to its terminal state, undoing the local
    /// change on failure when the policy says so.
    async fn settle<T>(&self, mut mutation: Mutation, result: Result<T>, fallback: &str) -> Result<T> {
        match result {
            Ok(value) => {
                mutation.transition(MutationState::Confirmed);
                tracing::info!(mutation = %mutation.id, "✅ {} confirmed", mutation.kind);
                Ok(value)
            }
            Err(e) => {
                mutation.transition(MutationState::Failed);
                tracing::error!(mutation = %mutation.id, "❌ {} failed: {}", mutation.kind, e);
                match self.policy {
                    RollbackPolicy::Revert => {
                        let mut feed = self.feed.lock().await;
                        mutation.undo.revert(&mut feed);
                        tracing::warn!(mutation = %mutation.id, "↩️ {} reverted", mutation.kind);
                    }
                    RollbackPolicy::Keep => {
                        tracing::warn!(
                            mutation = %mutation.id,
                            "⚠️ {} kept locally after failure",
                            mutation.kind
                        );
                    }
                }
                Err(e.with_fallback(fallback))
            }
        }
    }

    /// Swaps a placeholder id for the server id of the matching comment in
    /// the server's response: same text, same creator, not yet known
    /// locally, newest wins.
    async fn reconcile(
        &self,
        post_id: &PostId,
        local_id: &CommentId,
        content: &str,
        session: &Session,
        server_comments: Vec<Comment>,
    ) -> CommentId {
        let mut feed = self.feed.lock().await;
        let Some(post) = feed.page.post_mut(post_id) else {
            return local_id.clone();
        };

        let matched = server_comments
            .into_iter()
            .filter(|c| c.content == content && &c.creator.id == session.subject())
            .filter(|c| post.comment(&c.id).is_none())
            .max_by_key(|c| c.created_at);

        let Some(confirmed) = matched else {
            tracing::debug!("Placeholder {} not matched in server response", local_id);
            return local_id.clone();
        };

        match post.comment_mut(local_id) {
            Some(comment) => {
                tracing::debug!("🔗 Placeholder {} is now {}", local_id, confirmed.id);
                comment.id = confirmed.id;
                comment.creator = confirmed.creator;
                comment.created_at = confirmed.created_at;
                comment.id.clone()
            }
            None => local_id.clone(),
        }
    }
}

fn require_server_id(comment_id: &CommentId) -> Result<String> {
    comment_id.server_id().map(str::to_string).ok_or_else(|| {
        FeedError::ValidationRejected("This comment is still being posted".to_string())
    })
}
