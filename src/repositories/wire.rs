//! JSON shapes of the remote API and their conversion into domain models.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{
    comment::{Comment, CommentId},
    feed::PaginationInfo,
    post::{Post, PostId},
    user::{Profile, UserId, UserRef},
};

/// Empty URLs and URLs built from an `undefined` value mean "no photo".
pub fn normalize_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty() && !u.contains("undefined"))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserDto {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photo: Option<String>,
}

impl From<UserDto> for UserRef {
    fn from(dto: UserDto) -> Self {
        UserRef {
            id: UserId::new(dto.id),
            name: dto.name,
            photo: normalize_url(dto.photo),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub comment_creator: UserDto,
    #[serde(default)]
    pub post: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CommentDto {
    /// Converts the comment; `parent` wins over the embedded `post` field.
    pub fn into_comment(self, parent: Option<&PostId>) -> Comment {
        let post_id = parent
            .cloned()
            .or_else(|| self.post.map(PostId::new))
            .unwrap_or_else(|| PostId::new(""));
        Comment {
            id: CommentId::Confirmed(self.id),
            post_id,
            content: self.content,
            creator: self.comment_creator.into(),
            created_at: self.created_at.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub user: UserDto,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Vec<CommentDto>,
}

impl From<PostDto> for Post {
    fn from(dto: PostDto) -> Self {
        let id = PostId::new(dto.id);
        let comments = dto
            .comments
            .into_iter()
            .map(|c| c.into_comment(Some(&id)))
            .collect();
        Post {
            id,
            user: dto.user.into(),
            body: dto.body.unwrap_or_default(),
            image: normalize_url(dto.image),
            created_at: dto.created_at.unwrap_or_default(),
            comments,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ProfileDto> for Profile {
    fn from(dto: ProfileDto) -> Self {
        Profile {
            id: UserId::new(dto.id),
            name: dto.name,
            email: dto.email,
            photo: normalize_url(dto.photo),
            gender: dto.gender,
            date_of_birth: dto.date_of_birth,
            created_at: dto.created_at.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsEnvelope {
    #[serde(default)]
    pub posts: Vec<PostDto>,
    #[serde(default)]
    pub pagination_info: Option<PaginationInfo>,
}

#[derive(Debug, Deserialize)]
pub struct PostEnvelope {
    pub post: PostDto,
}

#[derive(Debug, Deserialize)]
pub struct ProfileEnvelope {
    pub user: ProfileDto,
}

#[derive(Debug, Deserialize)]
pub struct TokenEnvelope {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentsEnvelope {
    #[serde(default)]
    pub comments: Vec<CommentDto>,
}

/// Error body: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<String>,
}
