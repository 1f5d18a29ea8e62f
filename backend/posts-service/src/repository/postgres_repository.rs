use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{PostRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Post, PostChanges, User};

/// PostgreSQL repository for posts and their owners (source of truth)
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PostRepository for PostgresRepository {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.owner_id, u.username AS owner, p.title, p.content,
                   p.created_at, p.updated_at
            FROM posts p
            JOIN users u ON u.id = p.owner_id
            ORDER BY p.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.owner_id, u.username AS owner, p.title, p.content,
                   p.created_at, p.updated_at
            FROM posts p
            JOIN users u ON u.id = p.owner_id
            WHERE p.id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn count_posts(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn insert_post(&self, owner_id: Uuid, changes: PostChanges) -> Result<Post> {
        let result = sqlx::query_as::<_, Post>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (owner_id, title, content)
                VALUES ($1, $2, $3)
                RETURNING id, owner_id, title, content, created_at, updated_at
            )
            SELECT i.id, i.owner_id, u.username AS owner, i.title, i.content,
                   i.created_at, i.updated_at
            FROM inserted i
            JOIN users u ON u.id = i.owner_id
            "#,
        )
        .bind(owner_id)
        .bind(&changes.title)
        .bind(&changes.content)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(post) => {
                debug!(post_id = post.id, user_id = %owner_id, "post inserted");
                Ok(post)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(AppError::Unauthorized("Unknown user".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            WITH updated AS (
                UPDATE posts
                SET title = $2, content = $3, updated_at = NOW()
                WHERE id = $1
                RETURNING id, owner_id, title, content, created_at, updated_at
            )
            SELECT p.id, p.owner_id, u.username AS owner, p.title, p.content,
                   p.created_at, p.updated_at
            FROM updated p
            JOIN users u ON u.id = p.owner_id
            "#,
        )
        .bind(post_id)
        .bind(&changes.title)
        .bind(&changes.content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserRepository for PostgresRepository {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                AppError::Conflict(format!("username '{}' is already taken", username)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
