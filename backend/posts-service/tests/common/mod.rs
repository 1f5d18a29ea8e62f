//! Shared fixtures for HTTP tests.
//!
//! Apps run against the in-memory store. Users for post tests are inserted
//! straight into the repository with a placeholder hash and given a minted
//! token, so Argon2 only runs in the account tests.

#![allow(dead_code)]

use crypto_core::JwtKeys;
use once_cell::sync::Lazy;
use posts_service::models::{Actor, Post, PostChanges};
use posts_service::repository::Storage;
use posts_service::AppContext;
use std::sync::Arc;

pub const PRIVATE_KEY: &str = include_str!("../fixtures/jwt_private.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/jwt_public.pem");

pub static KEYS: Lazy<Arc<JwtKeys>> = Lazy::new(|| {
    Arc::new(JwtKeys::from_rsa_pem(PRIVATE_KEY, PUBLIC_KEY).expect("test keys"))
});

pub struct TestUser {
    pub actor: Actor,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

pub struct Fixture {
    pub storage: Storage,
    pub context: AppContext,
}

impl Fixture {
    pub fn new() -> Self {
        let storage = Storage::in_memory();
        let context = AppContext::new(storage.clone(), KEYS.clone());
        Self { storage, context }
    }

    pub async fn add_user(&self, username: &str) -> TestUser {
        let user = self
            .storage
            .users
            .insert_user(username, "$argon2id$unused")
            .await
            .expect("insert user");
        let token = KEYS
            .generate_access_token(user.id, &user.username)
            .expect("mint token");

        TestUser {
            actor: Actor::from(&user),
            token,
        }
    }

    /// Store a post directly, bypassing HTTP.
    pub async fn add_post(&self, owner: &TestUser, title: &str, content: &str) -> Post {
        self.storage
            .posts
            .insert_post(
                owner.actor.id,
                PostChanges {
                    title: title.to_string(),
                    content: content.to_string(),
                },
            )
            .await
            .expect("insert post")
    }

    pub async fn stored_post(&self, post_id: i64) -> Option<Post> {
        self.storage
            .posts
            .find_post(post_id)
            .await
            .expect("find post")
    }

    pub async fn post_count(&self) -> i64 {
        self.storage.posts.count_posts().await.expect("count posts")
    }
}

/// Two users, each owning one post: rob owns post 1, bertie owns post 2.
pub struct DetailFixture {
    pub base: Fixture,
    pub rob: TestUser,
    pub bertie: TestUser,
}

impl DetailFixture {
    pub async fn new() -> Self {
        let base = Fixture::new();
        let rob = base.add_user("rob").await;
        let bertie = base.add_user("bertie").await;
        base.add_post(&rob, "rob test title", "rob test content")
            .await;
        base.add_post(&bertie, "bertie tests title", "bertie test content")
            .await;

        Self { base, rob, bertie }
    }
}
