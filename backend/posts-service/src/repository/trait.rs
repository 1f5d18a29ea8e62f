use uuid::Uuid;

use crate::error::Result;
use crate::models::{Post, PostChanges, User};

/// Storage operations for posts.
/// Both PostgresRepository and MemoryRepository implement this.
///
/// Each method is atomic on its own: a write either lands completely or not
/// at all. Ownership is fixed by `insert_post` and no method changes it.
#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, newest first. Ids are sequential, so this is highest id first
    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>>;

    async fn count_posts(&self) -> Result<i64>;

    /// Create a post owned by `owner_id`, assigning the next id
    async fn insert_post(&self, owner_id: Uuid, changes: PostChanges) -> Result<Post>;

    /// Overwrite title and content; `None` if the post does not exist
    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Option<Post>>;

    /// Returns whether a post was removed
    async fn delete_post(&self, post_id: i64) -> Result<bool>;

    /// Check the backing store is reachable
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Storage operations for accounts.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username is taken
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
}
