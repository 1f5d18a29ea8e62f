/// Posts Service Library
///
/// Serves a posts collection with ownership-based write permissions: anyone
/// may read, signed-in users may create, and only a post's owner may change
/// or delete it.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and the route table
/// - `models`: Users, actors, posts and request/response bodies
/// - `services`: Business logic layer
/// - `repository`: Storage trait with PostgreSQL and in-memory backends
/// - `middleware`: Bearer authentication, request metrics and the ownership guard
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use actix_web::web;
use crypto_core::JwtKeys;
use std::sync::Arc;

use crate::handlers::HealthState;
use crate::repository::Storage;
use crate::services::{AccountService, PostService};

/// Shared application state, built once and cloned into every worker.
#[derive(Clone)]
pub struct AppContext {
    posts: web::Data<PostService>,
    accounts: web::Data<AccountService>,
    jwt: web::Data<JwtKeys>,
    health: web::Data<HealthState>,
}

impl AppContext {
    pub fn new(storage: Storage, jwt: Arc<JwtKeys>) -> Self {
        Self {
            posts: web::Data::new(PostService::new(storage.posts.clone())),
            accounts: web::Data::new(AccountService::new(storage.users.clone(), jwt.clone())),
            jwt: web::Data::from(jwt),
            health: web::Data::new(HealthState::new(storage.posts)),
        }
    }

    /// Register state and routes on an `App` or scope.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.posts.clone())
            .app_data(self.accounts.clone())
            .app_data(self.jwt.clone())
            .app_data(self.health.clone());
        handlers::configure(cfg);
    }
}
