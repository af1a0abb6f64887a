use async_trait::async_trait;
use http::{HeaderValue, header};
use reqwest::{
    Client, RequestBuilder,
    multipart::{Form, Part},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{FeedError, Result},
    models::{
        account::{ChangePasswordRequest, SignInRequest, SignUpRequest},
        comment::Comment,
        media::ImageUpload,
        post::{Post, PostId},
        session::Session,
        user::{Profile, UserId},
    },
    repositories::{
        api::{PostsPage, RemoteApi},
        wire::{
            CommentsEnvelope, ErrorEnvelope, PostEnvelope, PostsEnvelope, ProfileEnvelope,
            TokenEnvelope,
        },
    },
};

/// The API expects the credential in a header literally named `token`.
pub const TOKEN_HEADER: &str = "token";

/// `RemoteApi` over HTTP.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder, session: &Session) -> Result<RequestBuilder> {
        let mut value = HeaderValue::from_str(session.token()).map_err(|_| {
            tracing::warn!("❌ Session token is not a valid header value");
            FeedError::SessionAbsent
        })?;
        value.set_sensitive(true);
        Ok(builder.header(TOKEN_HEADER, value))
    }

    fn json_body<T: Serialize>(builder: RequestBuilder, payload: &T) -> Result<RequestBuilder> {
        let body = sonic_rs::to_string(payload)?;
        Ok(builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(body))
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("❌ Request failed: {}", e);
            FeedError::remote(e.status().map(|s| s.as_u16()), None)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!("❌ Failed to read response body: {}", e);
            FeedError::remote(Some(status.as_u16()), None)
        })?;

        if !status.is_success() {
            let server_message = sonic_rs::from_slice::<ErrorEnvelope>(&bytes)
                .ok()
                .and_then(|envelope| envelope.error);
            tracing::warn!(
                "❌ API responded {} {}",
                status.as_u16(),
                server_message.as_deref().unwrap_or("")
            );
            return Err(FeedError::remote(Some(status.as_u16()), server_message));
        }

        Ok(bytes.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let bytes = self.send(builder).await?;
        Ok(sonic_rs::from_slice(&bytes)?)
    }
}

fn image_part(image: &ImageUpload) -> Result<Part> {
    let mime = image.mime_type().unwrap_or("application/octet-stream");
    Part::bytes(image.bytes.clone())
        .file_name(image.filename.clone())
        .mime_str(mime)
        .map_err(|e| FeedError::ValidationRejected(format!("Invalid image type: {}", e)))
}

fn into_page(envelope: PostsEnvelope) -> PostsPage {
    PostsPage {
        posts: envelope.posts.into_iter().map(Post::from).collect(),
        pagination: envelope.pagination_info.unwrap_or_default(),
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn sign_in(&self, request: &SignInRequest) -> Result<String> {
        tracing::debug!("🔐 POST /users/signin");
        let builder = Self::json_body(self.client.post(self.url("/users/signin")), request)?;
        let envelope: TokenEnvelope = self.fetch(builder).await?;
        Ok(envelope.token)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<()> {
        tracing::debug!("📝 POST /users/signup");
        let builder = Self::json_body(self.client.post(self.url("/users/signup")), request)?;
        self.send(builder).await?;
        Ok(())
    }

    async fn profile(&self, session: &Session) -> Result<Profile> {
        let builder = self.authed(self.client.get(self.url("/users/profile-data")), session)?;
        let envelope: ProfileEnvelope = self.fetch(builder).await?;
        Ok(envelope.user.into())
    }

    async fn upload_photo(&self, session: &Session, photo: &ImageUpload) -> Result<()> {
        let form = Form::new().part("photo", image_part(photo)?);
        let builder = self.authed(self.client.put(self.url("/users/upload-photo")), session)?;
        self.send(builder.multipart(form)).await?;
        Ok(())
    }

    async fn change_password(
        &self,
        session: &Session,
        request: &ChangePasswordRequest,
    ) -> Result<()> {
        let builder = self.authed(
            self.client.patch(self.url("/users/change-password")),
            session,
        )?;
        self.send(Self::json_body(builder, request)?).await?;
        Ok(())
    }

    async fn list_posts(&self, session: &Session, limit: u32, page: u32) -> Result<PostsPage> {
        tracing::debug!("📥 GET /posts limit={} page={}", limit, page);
        let builder = self
            .client
            .get(self.url("/posts"))
            .query(&[("limit", limit), ("page", page)]);
        let envelope: PostsEnvelope = self.fetch(self.authed(builder, session)?).await?;
        Ok(into_page(envelope))
    }

    async fn get_post(&self, session: &Session, post_id: &PostId) -> Result<Post> {
        let builder = self.client.get(self.url(&format!("/posts/{}", post_id)));
        let envelope: PostEnvelope = self.fetch(self.authed(builder, session)?).await?;
        Ok(envelope.post.into())
    }

    async fn create_post(
        &self,
        session: &Session,
        body: &str,
        image: Option<&ImageUpload>,
    ) -> Result<()> {
        let mut form = Form::new().text("body", body.to_string());
        if let Some(image) = image {
            form = form.part("image", image_part(image)?);
        }
        let builder = self.authed(self.client.post(self.url("/posts")), session)?;
        self.send(builder.multipart(form)).await?;
        Ok(())
    }

    async fn delete_post(&self, session: &Session, post_id: &PostId) -> Result<()> {
        let builder = self.client.delete(self.url(&format!("/posts/{}", post_id)));
        self.send(self.authed(builder, session)?).await?;
        Ok(())
    }

    async fn list_user_posts(
        &self,
        session: &Session,
        user_id: &UserId,
        limit: u32,
    ) -> Result<PostsPage> {
        tracing::debug!("📥 GET /users/{}/posts limit={}", user_id, limit);
        let builder = self
            .client
            .get(self.url(&format!("/users/{}/posts", user_id)))
            .query(&[("limit", limit)]);
        let envelope: PostsEnvelope = self.fetch(self.authed(builder, session)?).await?;
        Ok(into_page(envelope))
    }

    async fn create_comment(
        &self,
        session: &Session,
        post_id: &PostId,
        content: &str,
    ) -> Result<Vec<Comment>> {
        let payload = sonic_rs::json!({ "content": content, "post": post_id.as_str() });
        let builder = self.authed(self.client.post(self.url("/comments")), session)?;
        let bytes = self.send(Self::json_body(builder, &payload)?).await?;

        // A body without a comment list still means the comment was created.
        let comments = sonic_rs::from_slice::<CommentsEnvelope>(&bytes)
            .map(|envelope| envelope.comments)
            .unwrap_or_default();
        Ok(comments
            .into_iter()
            .map(|c| c.into_comment(Some(post_id)))
            .collect())
    }

    async fn update_comment(
        &self,
        session: &Session,
        comment_id: &str,
        content: &str,
    ) -> Result<()> {
        let payload = sonic_rs::json!({ "content": content });
        let builder = self.authed(
            self.client.put(self.url(&format!("/comments/{}", comment_id))),
            session,
        )?;
        self.send(Self::json_body(builder, &payload)?).await?;
        Ok(())
    }

    async fn delete_comment(&self, session: &Session, comment_id: &str) -> Result<()> {
        let builder = self
            .client
            .delete(self.url(&format!("/comments/{}", comment_id)));
        self.send(self.authed(builder, session)?).await?;
        Ok(())
    }
}
