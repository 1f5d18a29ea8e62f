use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PostRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Post, PostChanges, User};

/// In-process store used when no database is configured, and by tests.
///
/// All state sits behind one lock so every write is atomic with respect to
/// every read.
#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    posts: BTreeMap<i64, Post>,
    last_post_id: i64,
    users: HashMap<Uuid, User>,
    user_ids_by_name: HashMap<String, Uuid>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PostRepository for MemoryRepository {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        // Ids are assigned under the write lock, so id order is creation order
        let state = self.state.read().await;
        Ok(state.posts.values().rev().cloned().collect())
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        Ok(self.state.read().await.posts.get(&post_id).cloned())
    }

    async fn count_posts(&self) -> Result<i64> {
        Ok(self.state.read().await.posts.len() as i64)
    }

    async fn insert_post(&self, owner_id: Uuid, changes: PostChanges) -> Result<Post> {
        let mut state = self.state.write().await;

        let owner = state
            .users
            .get(&owner_id)
            .map(|u| u.username.clone())
            .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

        state.last_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: state.last_post_id,
            owner_id,
            owner,
            title: changes.title,
            content: changes.content,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(post.id, post.clone());

        Ok(post)
    }

    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Option<Post>> {
        let mut state = self.state.write().await;

        Ok(state.posts.get_mut(&post_id).map(|post| {
            post.title = changes.title;
            post.content = changes.content;
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        Ok(self.state.write().await.posts.remove(&post_id).is_some())
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryRepository {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut state = self.state.write().await;

        if state.user_ids_by_name.contains_key(username) {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                username
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        state.user_ids_by_name.insert(user.username.clone(), user.id);
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .user_ids_by_name
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned())
    }
}
