mod memory_repository;
mod postgres_repository;
mod r#trait;

pub use memory_repository::MemoryRepository;
pub use postgres_repository::PostgresRepository;
pub use r#trait::{PostRepository, UserRepository};

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Repository handles shared by the services.
#[derive(Clone)]
pub struct Storage {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    pub fn in_memory() -> Self {
        let repo = Arc::new(MemoryRepository::new());
        Self {
            posts: repo.clone(),
            users: repo,
        }
    }

    /// Connect to PostgreSQL and bring the schema up to date.
    pub async fn connect_postgres(cfg: &DatabaseConfig, url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .connect(url)
            .await?;

        let repo = Arc::new(PostgresRepository::new(pool));
        repo.migrate().await?;
        tracing::info!(max_connections = cfg.max_connections, "PostgreSQL schema ready");

        Ok(Self {
            posts: repo.clone(),
            users: repo,
        })
    }

    /// PostgreSQL when `DATABASE_URL` is configured, otherwise in-memory.
    pub async fn from_config(cfg: &DatabaseConfig) -> Result<Self> {
        match cfg.url.as_deref() {
            Some(url) => Self::connect_postgres(cfg, url).await,
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory storage");
                Ok(Self::in_memory())
            }
        }
    }
}
