use async_trait::async_trait;

use crate::{
    error::Result,
    models::{
        account::{ChangePasswordRequest, SignInRequest, SignUpRequest},
        comment::Comment,
        feed::PaginationInfo,
        media::ImageUpload,
        post::{Post, PostId},
        session::Session,
        user::{Profile, UserId},
    },
};

/// Posts as the API returns them (oldest first), with pagination metadata.
#[derive(Debug, Clone, Default)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    pub pagination: PaginationInfo,
}

/// The remote social API.
///
/// Every authenticated call takes the caller's [`Session`]. Failures come
/// back as [`crate::error::FeedError::Remote`] so call sites can pick their
/// own fallback message.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Exchanges credentials for a token.
    async fn sign_in(&self, request: &SignInRequest) -> Result<String>;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<()>;

    /// Loads the signed-in user's profile.
    async fn profile(&self, session: &Session) -> Result<Profile>;

    async fn upload_photo(&self, session: &Session, photo: &ImageUpload) -> Result<()>;

    async fn change_password(
        &self,
        session: &Session,
        request: &ChangePasswordRequest,
    ) -> Result<()>;

    /// Lists one page of the global feed.
    async fn list_posts(&self, session: &Session, limit: u32, page: u32) -> Result<PostsPage>;

    async fn get_post(&self, session: &Session, post_id: &PostId) -> Result<Post>;

    async fn create_post(
        &self,
        session: &Session,
        body: &str,
        image: Option<&ImageUpload>,
    ) -> Result<()>;

    async fn delete_post(&self, session: &Session, post_id: &PostId) -> Result<()>;

    /// Lists the posts authored by `user_id`.
    async fn list_user_posts(
        &self,
        session: &Session,
        user_id: &UserId,
        limit: u32,
    ) -> Result<PostsPage>;

    /// Creates a comment and returns the post's comments as the server now
    /// has them.
    async fn create_comment(
        &self,
        session: &Session,
        post_id: &PostId,
        content: &str,
    ) -> Result<Vec<Comment>>;

    async fn update_comment(&self, session: &Session, comment_id: &str, content: &str)
    -> Result<()>;

    async fn delete_comment(&self, session: &Session, comment_id: &str) -> Result<()>;
}
