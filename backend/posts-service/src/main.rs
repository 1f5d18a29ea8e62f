use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use anyhow::Context;
use crypto_core::JwtKeys;
use posts_service::repository::Storage;
use posts_service::{AppContext, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Posts Service
///
/// Serves `/posts/` (list, create) and `/posts/{id}/` (retrieve, update,
/// partial update, delete) with owner-only writes, plus `/auth/register/`
/// and `/auth/login/` for obtaining bearer tokens.
///
/// Storage is PostgreSQL when `DATABASE_URL` is set and in-memory otherwise.
/// The binary also accepts a `healthcheck` subcommand for container probes.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    // Support container healthchecks via CLI subcommand
    if let Some(cmd) = std::env::args().nth(1) {
        if cmd == "healthcheck" || cmd == "healthcheck-http" {
            return healthcheck(&config).await;
        }
    }

    init_tracing(&config);

    tracing::info!("Starting posts-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let jwt = JwtKeys::from_rsa_pem(&config.jwt.private_key_pem, &config.jwt.public_key_pem)
        .context("failed to initialize JWT keys")?
        .with_access_ttl(chrono::Duration::seconds(config.jwt.access_token_ttl_secs));

    let storage = Storage::from_config(&config.database)
        .await
        .context("failed to initialize storage")?;

    let context = AppContext::new(storage, Arc::new(jwt));
    let bind_address = config.bind_address();
    let allowed_origins = config.cors.allowed_origins.clone();

    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let context = context.clone();
        App::new()
            .configure(move |cfg| context.configure(cfg))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {bind_address}"))?
    .workers(config.app.workers)
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("posts-service shutting down");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.app.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn healthcheck(config: &Config) -> anyhow::Result<()> {
    let url = format!("http://127.0.0.1:{}/health", config.app.port);
    let resp = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("healthcheck request to {url} failed"))?;

    if resp.status().is_success() {
        Ok(())
    } else {
        anyhow::bail!("healthcheck HTTP status: {}", resp.status())
    }
}
