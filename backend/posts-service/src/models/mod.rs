/// Data models for posts-service
///
/// - `User` / `Actor`: stored accounts and the authenticated identity on a request
/// - `Post`: a titled piece of content owned by exactly one user
/// - Request and response bodies for the HTTP surface
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::permissions::allow_mutation;

/// Stored account. Never serialized directly: the hash stays server-side.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Authenticated identity attached to a request.
///
/// Two actors are the same actor when their ids match; the username is
/// carried for display only.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub username: String,
}

impl PartialEq for Actor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Actor {}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub owner_id: Uuid,
    /// Owner's username, joined from `users`
    pub owner: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written to a post by create or update. Never carries an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
}

/// Body for `POST /posts/` and `PUT /posts/{id}/`.
///
/// Unknown fields such as `owner` are ignored. A missing title decodes as
/// empty so it is reported by validation, after the permission check.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostFields {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub title: String,
    pub content: Option<String>,
}

impl PostFields {
    /// Full replacement: absent content becomes empty.
    pub fn into_changes(self) -> PostChanges {
        PostChanges {
            title: self.title,
            content: self.content.unwrap_or_default(),
        }
    }
}

/// Body for `PATCH /posts/{id}/`. Only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostPatch {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    pub fn apply_to(self, post: &Post) -> PostChanges {
        PostChanges {
            title: self.title.unwrap_or_else(|| post.title.clone()),
            content: self.content.unwrap_or_else(|| post.content.clone()),
        }
    }
}

/// Wire representation of a post for a given viewer.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub owner: String,
    pub owner_id: Uuid,
    pub is_owner: bool,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn for_viewer(post: Post, viewer: Option<&Actor>) -> Self {
        let is_owner = allow_mutation(viewer, &post);
        Self {
            id: post.id,
            owner: post.owner,
            owner_id: post.owner_id,
            is_owner,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Body for `POST /auth/register/` and `POST /auth/login/`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
