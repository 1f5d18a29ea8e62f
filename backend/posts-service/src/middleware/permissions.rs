/// Authorization module for posts-service
///
/// Ownership-based permission checks. Reading is open to everyone; creating
/// needs an authenticated actor; mutating an existing post needs the actor
/// to be its owner. These functions never touch HTTP or storage.
use crate::error::AppError;
use crate::models::{Actor, Post};

/// Result type for permission checks
pub type PermissionResult = Result<(), AppError>;

/// True when `actor` is present and owns `post`.
pub fn allow_mutation(actor: Option<&Actor>, post: &Post) -> bool {
    matches!(actor, Some(actor) if actor.id == post.owner_id)
}

/// Creating a post only requires someone to be signed in
pub fn check_post_creation(actor: Option<&Actor>) -> Result<&Actor, AppError> {
    actor.ok_or(AppError::PermissionDenied)
}

/// Only the owner can update their own posts
pub fn check_post_update(actor: Option<&Actor>, post: &Post) -> PermissionResult {
    if allow_mutation(actor, post) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Only the owner can delete their own posts
pub fn check_post_deletion(actor: Option<&Actor>, post: &Post) -> PermissionResult {
    check_post_update(actor, post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn actor(name: &str) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            username: name.to_string(),
        }
    }

    fn post_owned_by(owner: &Actor) -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            owner_id: owner.id,
            owner: owner.username.clone(),
            title: "rob test title".into(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_may_mutate() {
        let rob = actor("rob");
        let post = post_owned_by(&rob);

        assert!(allow_mutation(Some(&rob), &post));
        assert!(check_post_update(Some(&rob), &post).is_ok());
        assert!(check_post_deletion(Some(&rob), &post).is_ok());
    }

    #[test]
    fn other_actor_may_not_mutate() {
        let rob = actor("rob");
        let bertie = actor("bertie");
        let post = post_owned_by(&bertie);

        assert!(!allow_mutation(Some(&rob), &post));
        assert!(matches!(
            check_post_update(Some(&rob), &post),
            Err(AppError::PermissionDenied)
        ));
    }

    #[test]
    fn anonymous_may_not_mutate_or_create() {
        let rob = actor("rob");
        let post = post_owned_by(&rob);

        assert!(!allow_mutation(None, &post));
        assert!(matches!(
            check_post_deletion(None, &post),
            Err(AppError::PermissionDenied)
        ));
        assert!(matches!(
            check_post_creation(None),
            Err(AppError::PermissionDenied)
        ));
        assert_eq!(check_post_creation(Some(&rob)).unwrap(), &rob);
    }

    #[test]
    fn same_username_different_id_is_not_owner() {
        let rob = actor("rob");
        let impostor = actor("rob");
        let post = post_owned_by(&rob);

        assert!(!allow_mutation(Some(&impostor), &post));
    }
}
