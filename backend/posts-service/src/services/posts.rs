/// Post service - handles post creation, retrieval, and management
///
/// Every mutating operation takes the acting user explicitly and runs the
/// same sequence: look the post up, check ownership, validate, then write.
/// Bodies arrive as `Result`s; an extraction error is a validation failure
/// and surfaces at the validation step, never earlier.
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::metrics::record_post_operation;
use crate::middleware::permissions::{
    check_post_creation, check_post_deletion, check_post_update,
};
use crate::models::{Actor, Post, PostChanges, PostFields, PostPatch};
use crate::repository::PostRepository;

pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// All posts, newest first. Open to anonymous callers.
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let result = self.repo.list_posts().await;
        record_post_operation("list", &result);
        result
    }

    pub async fn count_posts(&self) -> Result<i64> {
        self.repo.count_posts().await
    }

    /// Get a post by ID. Open to anonymous callers.
    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        let result = self.find_existing(post_id).await;
        record_post_operation("retrieve", &result);
        result
    }

    /// Create a new post owned by `actor`
    pub async fn create_post(
        &self,
        actor: Option<&Actor>,
        body: Result<PostFields>,
    ) -> Result<Post> {
        let result = self.create(actor, body).await;
        record_post_operation("create", &result);
        result
    }

    /// Replace title and content. Absent content is cleared.
    pub async fn update_post(
        &self,
        actor: Option<&Actor>,
        post_id: i64,
        body: Result<PostFields>,
    ) -> Result<Post> {
        let result = self.update(actor, post_id, body).await;
        record_post_operation("update", &result);
        result
    }

    /// Change only the supplied fields
    pub async fn partial_update_post(
        &self,
        actor: Option<&Actor>,
        post_id: i64,
        body: Result<PostPatch>,
    ) -> Result<Post> {
        let result = self.partial_update(actor, post_id, body).await;
        record_post_operation("partial_update", &result);
        result
    }

    pub async fn delete_post(&self, actor: Option<&Actor>, post_id: i64) -> Result<()> {
        let result = self.delete(actor, post_id).await;
        record_post_operation("delete", &result);
        result
    }

    async fn find_existing(&self, post_id: i64) -> Result<Post> {
        self.repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    async fn create(&self, actor: Option<&Actor>, body: Result<PostFields>) -> Result<Post> {
        let actor = check_post_creation(actor)?;
        let fields = body?;
        fields.validate()?;
        let changes = fields.into_changes();
        ensure_title_not_blank(&changes)?;

        let post = self.repo.insert_post(actor.id, changes).await?;
        tracing::info!(post_id = post.id, user_id = %actor.id, "post created");
        Ok(post)
    }

    async fn update(
        &self,
        actor: Option<&Actor>,
        post_id: i64,
        body: Result<PostFields>,
    ) -> Result<Post> {
        let post = self.find_existing(post_id).await?;
        check_post_update(actor, &post)?;
        let fields = body?;
        fields.validate()?;
        let changes = fields.into_changes();
        ensure_title_not_blank(&changes)?;

        self.write(actor, post_id, changes).await
    }

    async fn partial_update(
        &self,
        actor: Option<&Actor>,
        post_id: i64,
        body: Result<PostPatch>,
    ) -> Result<Post> {
        let post = self.find_existing(post_id).await?;
        check_post_update(actor, &post)?;
        let patch = body?;
        patch.validate()?;
        let changes = patch.apply_to(&post);
        ensure_title_not_blank(&changes)?;

        self.write(actor, post_id, changes).await
    }

    async fn write(&self, actor: Option<&Actor>, post_id: i64, changes: PostChanges) -> Result<Post> {
        // Deleted between lookup and write
        let post = self
            .repo
            .update_post(post_id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if let Some(actor) = actor {
            tracing::info!(post_id, user_id = %actor.id, "post updated");
        }
        Ok(post)
    }

    async fn delete(&self, actor: Option<&Actor>, post_id: i64) -> Result<()> {
        let post = self.find_existing(post_id).await?;
        check_post_deletion(actor, &post)?;

        if !self.repo.delete_post(post_id).await? {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        if let Some(actor) = actor {
            tracing::info!(post_id, user_id = %actor.id, "post deleted");
        }
        Ok(())
    }
}

fn ensure_title_not_blank(changes: &PostChanges) -> Result<()> {
    if changes.title.trim().is_empty() {
        return Err(AppError::Validation("title: may not be blank".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryRepository, UserRepository};

    struct Fixture {
        service: PostService,
        rob: Actor,
        bertie: Actor,
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(MemoryRepository::new());
        let rob = repo.insert_user("rob", "hash").await.unwrap();
        let bertie = repo.insert_user("bertie", "hash").await.unwrap();
        Fixture {
            service: PostService::new(repo),
            rob: Actor::from(&rob),
            bertie: Actor::from(&bertie),
        }
    }

    fn fields(title: &str, content: Option<&str>) -> Result<PostFields> {
        Ok(PostFields {
            title: title.to_string(),
            content: content.map(str::to_string),
        })
    }

    fn malformed<T>() -> Result<T> {
        Err(AppError::Validation("title: invalid type".to_string()))
    }

    #[tokio::test]
    async fn anonymous_create_is_denied_and_stores_nothing() {
        let fx = fixture().await;

        let result = fx.service.create_post(None, fields("test title", None)).await;

        assert!(matches!(result, Err(AppError::PermissionDenied)));
        assert_eq!(fx.service.count_posts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_sets_owner_to_actor() {
        let fx = fixture().await;

        let post = fx
            .service
            .create_post(Some(&fx.rob), fields("test title", None))
            .await
            .unwrap();

        assert_eq!(post.owner_id, fx.rob.id);
        assert_eq!(post.owner, "rob");
        assert_eq!(post.content, "");
    }

    #[tokio::test]
    async fn permission_is_checked_before_validation() {
        let fx = fixture().await;

        let anonymous = fx.service.create_post(None, fields("", None)).await;
        assert!(matches!(anonymous, Err(AppError::PermissionDenied)));

        let blank = fx.service.create_post(Some(&fx.rob), fields("   ", None)).await;
        assert!(matches!(blank, Err(AppError::Validation(_))));
        assert_eq!(fx.service.count_posts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_post_is_not_found_before_permission() {
        let fx = fixture().await;

        assert!(matches!(
            fx.service.get_post(999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.update_post(None, 999, fields("x", None)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.delete_post(Some(&fx.rob), 999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn only_owner_can_update() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(Some(&fx.bertie), fields("bertie tests title", Some("body")))
            .await
            .unwrap();

        let denied = fx
            .service
            .update_post(Some(&fx.rob), post.id, fields("updated title", None))
            .await;
        assert!(matches!(denied, Err(AppError::PermissionDenied)));

        let anonymous = fx
            .service
            .update_post(None, post.id, fields("updated title", None))
            .await;
        assert!(matches!(anonymous, Err(AppError::PermissionDenied)));

        let unchanged = fx.service.get_post(post.id).await.unwrap();
        assert_eq!(unchanged, post);

        let updated = fx
            .service
            .update_post(Some(&fx.bertie), post.id, fields("updated title", None))
            .await
            .unwrap();
        assert_eq!(updated.title, "updated title");
        assert_eq!(updated.content, "");
        assert_eq!(updated.owner_id, fx.bertie.id);
    }

    #[tokio::test]
    async fn partial_update_merges_fields() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(Some(&fx.rob), fields("rob test title", Some("rob test content")))
            .await
            .unwrap();

        let patched = fx
            .service
            .partial_update_post(
                Some(&fx.rob),
                post.id,
                Ok(PostPatch {
                    title: Some("patched".into()),
                    content: None,
                }),
            )
            .await
            .unwrap();

        assert_eq!(patched.title, "patched");
        assert_eq!(patched.content, "rob test content");
    }

    #[tokio::test]
    async fn only_owner_can_delete() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(Some(&fx.rob), fields("rob test title", None))
            .await
            .unwrap();

        assert!(matches!(
            fx.service.delete_post(Some(&fx.bertie), post.id).await,
            Err(AppError::PermissionDenied)
        ));
        assert_eq!(fx.service.count_posts().await.unwrap(), 1);

        fx.service.delete_post(Some(&fx.rob), post.id).await.unwrap();
        assert!(matches!(
            fx.service.get_post(post.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_reported_after_lookup_and_guard() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(Some(&fx.bertie), fields("bertie tests title", None))
            .await
            .unwrap();

        assert!(matches!(
            fx.service.create_post(None, malformed()).await,
            Err(AppError::PermissionDenied)
        ));
        assert!(matches!(
            fx.service.update_post(Some(&fx.rob), 999, malformed()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.update_post(Some(&fx.rob), post.id, malformed()).await,
            Err(AppError::PermissionDenied)
        ));
        assert!(matches!(
            fx.service
                .partial_update_post(None, post.id, malformed())
                .await,
            Err(AppError::PermissionDenied)
        ));
        assert!(matches!(
            fx.service
                .update_post(Some(&fx.bertie), post.id, malformed())
                .await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            fx.service.create_post(Some(&fx.rob), malformed()).await,
            Err(AppError::Validation(_))
        ));
    }
}
