#![allow(dead_code)]

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use nexora::{
    AppState, Config, FeedError, Result,
    models::{
        account::{ChangePasswordRequest, SignInRequest, SignUpRequest},
        comment::{Comment, CommentId},
        feed::PaginationInfo,
        media::ImageUpload,
        post::{Post, PostId},
        session::Session,
        user::{Profile, UserId, UserRef},
    },
    repositories::{
        api::{PostsPage, RemoteApi},
        session::MemorySessionStore,
    },
    services::mutations::RollbackPolicy,
};

pub fn token_for(user: &str) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(format!(r#"{{"user":"{}","iat":1716300000}}"#, user))
    )
}

pub fn session_for(user: &str) -> Session {
    Session::from_token(token_for(user)).unwrap()
}

pub fn user(id: &str, name: &str) -> UserRef {
    UserRef {
        id: UserId::new(id),
        name: name.to_string(),
        photo: None,
    }
}

/// Posts `p1..=pN`, oldest first, alternating authors u1/u2.
pub fn posts(count: usize) -> Vec<Post> {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    (1..=count)
        .map(|n| Post {
            id: PostId::new(format!("p{}", n)),
            user: if n % 2 == 1 {
                user("u1", "Ana")
            } else {
                user("u2", "Bo")
            },
            body: format!("post {}", n),
            image: None,
            created_at: base + Duration::minutes(n as i64),
            comments: Vec::new(),
        })
        .collect()
}

pub fn comment(id: &str, post: &str, creator: UserRef, content: &str) -> Comment {
    Comment {
        id: CommentId::confirmed(id),
        post_id: PostId::new(post),
        content: content.to_string(),
        creator,
        created_at: Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
    }
}

/// In-memory stand-in for the remote API.
pub struct FakeApi {
    pub posts: Mutex<Vec<Post>>,
    pub profile: Mutex<Profile>,
    pub calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, (u16, Option<String>)>>,
    comment_gate: Mutex<Option<Arc<Notify>>>,
    next_comment: Mutex<u64>,
}

impl FakeApi {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: Mutex::new(posts),
            profile: Mutex::new(Profile {
                id: UserId::new("u1"),
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                photo: Some("https://cdn.example.com/ana.png".to_string()),
                gender: Some("female".to_string()),
                date_of_birth: Some("1995-04-12".to_string()),
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            }),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            comment_gate: Mutex::new(None),
            next_comment: Mutex::new(0),
        }
    }

    /// Makes `operation` fail with `status` and an optional server message.
    pub fn fail(&self, operation: &'static str, status: u16, message: Option<&str>) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, (status, message.map(str::to_string)));
    }

    /// Holds every `create_comment` call until the returned handle is notified.
    pub fn hold_comments(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.comment_gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn server_post(&self, id: &str) -> Option<Post> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id.as_str() == id)
            .cloned()
    }

    fn record(&self, operation: &'static str, detail: String) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", operation, detail).trim_end().to_string());
        match self.failures.lock().unwrap().get(operation) {
            Some((status, message)) => Err(FeedError::remote(Some(*status), message.clone())),
            None => Ok(()),
        }
    }

    fn page(&self, posts: Vec<Post>, limit: u32, page: u32) -> PostsPage {
        let limit = limit.max(1) as usize;
        let number_of_pages = posts.len().div_ceil(limit).max(1) as u32;
        let start = (page.saturating_sub(1) as usize * limit).min(posts.len());
        let end = (start + limit).min(posts.len());
        PostsPage {
            posts: posts[start..end].to_vec(),
            pagination: PaginationInfo {
                current_page: page,
                number_of_pages,
            },
        }
    }
}

#[async_trait]
impl RemoteApi for FakeApi {
    async fn sign_in(&self, request: &SignInRequest) -> Result<String> {
        self.record("sign_in", request.email.clone())?;
        Ok(token_for("u1"))
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<()> {
        self.record("sign_up", request.email.clone())
    }

    async fn profile(&self, _session: &Session) -> Result<Profile> {
        self.record("profile", String::new())?;
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn upload_photo(&self, _session: &Session, photo: &ImageUpload) -> Result<()> {
        self.record("upload_photo", photo.filename.clone())?;
        self.profile.lock().unwrap().photo =
            Some(format!("https://cdn.example.com/{}", photo.filename));
        Ok(())
    }

    async fn change_password(
        &self,
        _session: &Session,
        _request: &ChangePasswordRequest,
    ) -> Result<()> {
        self.record("change_password", String::new())
    }

    async fn list_posts(&self, _session: &Session, limit: u32, page: u32) -> Result<PostsPage> {
        self.record("list_posts", format!("limit={} page={}", limit, page))?;
        let posts = self.posts.lock().unwrap().clone();
        Ok(self.page(posts, limit, page))
    }

    async fn get_post(&self, _session: &Session, post_id: &PostId) -> Result<Post> {
        self.record("get_post", post_id.to_string())?;
        self.server_post(post_id.as_str())
            .ok_or_else(|| FeedError::remote(Some(404), Some("post not found".to_string())))
    }

    async fn create_post(
        &self,
        session: &Session,
        body: &str,
        image: Option<&ImageUpload>,
    ) -> Result<()> {
        self.record("create_post", body.to_string())?;
        let mut posts = self.posts.lock().unwrap();
        let id = format!("p{}", posts.len() + 1);
        posts.push(Post {
            id: PostId::new(id),
            user: user(session.subject().as_str(), "Ana"),
            body: body.to_string(),
            image: image.map(|i| format!("https://cdn.example.com/{}", i.filename)),
            created_at: Utc::now(),
            comments: Vec::new(),
        });
        Ok(())
    }

    async fn delete_post(&self, _session: &Session, post_id: &PostId) -> Result<()> {
        self.record("delete_post", post_id.to_string())?;
        self.posts.lock().unwrap().retain(|p| &p.id != post_id);
        Ok(())
    }

    async fn list_user_posts(
        &self,
        _session: &Session,
        user_id: &UserId,
        limit: u32,
    ) -> Result<PostsPage> {
        self.record("list_user_posts", format!("{} limit={}", user_id, limit))?;
        let posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| &p.user.id == user_id)
            .cloned()
            .collect();
        Ok(self.page(posts, limit, 1))
    }

    async fn create_comment(
        &self,
        session: &Session,
        post_id: &PostId,
        content: &str,
    ) -> Result<Vec<Comment>> {
        let gate = self.comment_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.record("create_comment", format!("{} {}", post_id, content))?;

        let id = {
            let mut next = self.next_comment.lock().unwrap();
            *next += 1;
            format!("c{}", *next)
        };
        let creator = UserRef {
            id: session.subject().clone(),
            name: self.profile.lock().unwrap().name.clone(),
            photo: None,
        };

        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| &p.id == post_id)
            .ok_or_else(|| FeedError::remote(Some(404), Some("post not found".to_string())))?;
        post.comments.push(Comment {
            id: CommentId::confirmed(id),
            post_id: post_id.clone(),
            content: content.to_string(),
            creator,
            created_at: Utc::now(),
        });
        Ok(post.comments.clone())
    }

    async fn update_comment(
        &self,
        _session: &Session,
        comment_id: &str,
        content: &str,
    ) -> Result<()> {
        self.record("update_comment", format!("{} {}", comment_id, content))?;
        for post in self.posts.lock().unwrap().iter_mut() {
            for comment in post.comments.iter_mut() {
                if comment.id.server_id() == Some(comment_id) {
                    comment.content = content.to_string();
                }
            }
        }
        Ok(())
    }

    async fn delete_comment(&self, _session: &Session, comment_id: &str) -> Result<()> {
        self.record("delete_comment", comment_id.to_string())?;
        for post in self.posts.lock().unwrap().iter_mut() {
            post.comments.retain(|c| c.id.server_id() != Some(comment_id));
        }
        Ok(())
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub sessions: Arc<MemorySessionStore>,
    pub state: AppState,
}

/// A state backed by `FakeApi`, signed in as `u1`.
pub fn harness(posts: Vec<Post>, rollback: RollbackPolicy) -> Harness {
    harness_with_token(posts, rollback, Some(token_for("u1")))
}

pub fn harness_with_token(
    posts: Vec<Post>,
    rollback: RollbackPolicy,
    token: Option<String>,
) -> Harness {
    let api = Arc::new(FakeApi::new(posts));
    let sessions = Arc::new(match token {
        Some(token) => MemorySessionStore::with_token(token),
        None => MemorySessionStore::new(),
    });
    let config = Config {
        rollback,
        ..Config::default()
    };
    let state = AppState::with_parts(config, api.clone(), sessions.clone());
    Harness {
        api,
        sessions,
        state,
    }
}
